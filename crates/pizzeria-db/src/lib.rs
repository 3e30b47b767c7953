//! # pizzeria-db: Database Layer for the Pizzeria Backend
//!
//! This crate provides database access for the ordering system.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pizzeria Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (POST /api/checkout)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   pizzeria-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ MenuRepo       │   │              │   │   │
//! │  │   │ SqlitePool    │◄───│ CustomizationR │   │ 001_init.sql │   │   │
//! │  │   │ Connection    │    │ OrderRepo      │   │ ...          │   │   │
//! │  │   │ Management    │    │ PromotionRepo  │   │              │   │   │
//! │  │   │               │    │ CustomerRepo   │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     ./pizzeria.db                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (menu, orders, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pizzeria_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./pizzeria.db")).await?;
//!
//! let pizzas = db.menu().list_specialties(ItemKind::Pizza).await?;
//! let queue = db.orders().kitchen_orders().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::customization::CustomizationRepository;
pub use repository::menu::MenuRepository;
pub use repository::order::OrderRepository;
pub use repository::promotion::PromotionRepository;
