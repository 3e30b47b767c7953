//! # pizzeria-core: Pure Business Logic for the Pizzeria Backend
//!
//! This crate holds every business rule of the ordering system as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pizzeria Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Storefront / Admin / Kitchen (React)             │   │
//! │  │    Menu ──► Builder ──► Cart ──► Checkout      Kitchen Display  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pizzeria-api (axum)                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pizzeria-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌──────────┐         │   │
//! │  │   │ pricing  │ │promotion │ │   cart    │ │ kitchen  │         │   │
//! │  │   │ options  │ │ pair 50% │ │  totals   │ │ statuses │         │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pizzeria-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (MenuItem, CustomizationGroup, Order, Promotion, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Customization pricing for a single menu item
//! - [`promotion`] - Promotion discounts (pizza pairs, percent, fixed amount)
//! - [`cart`] - Cart lines and totals
//! - [`order`] - Checkout validation and order construction
//! - [`kitchen`] - Order status machine and kitchen queue
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pizzeria_core::money::Money;
//! use pizzeria_core::types::TaxRate;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let tax = price.calculate_tax(TaxRate::from_bps(825)); // 8.25%
//! assert_eq!(tax.cents(), 91);
//! ```

pub mod cart;
pub mod error;
pub mod kitchen;
pub mod money;
pub mod order;
pub mod pricing;
pub mod promotion;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, PricingError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of distinct lines in a single cart.
pub const MAX_CART_LINES: usize = 50;

/// Maximum quantity of a single cart line.
///
/// Catches typos like 100 pizzas instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 99;

/// Maximum multiplier on a single customization option ("extra", "triple", ...).
pub const MAX_OPTION_QUANTITY: i64 = 10;

/// Largest menu price, option modifier or promotion amount an admin can
/// enter: $10,000.00. Keeps every cart total far inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 1_000_000;

/// Default discount of the pizza pair promotion: 5000 bps = 50%.
pub const DEFAULT_PAIR_DISCOUNT_BPS: u32 = 5000;
