//! # Cart
//!
//! Cart lines and cart totals.
//!
//! The storefront keeps the cart client-side and sends it back for quoting
//! and checkout; the server rebuilds a [`Cart`] from fresh menu data every
//! time, so prices in the cart can never be tampered with.
//!
//! ## Totals Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Σ line totals ──► subtotal                                             │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │            best live promotion ──► discount                             │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │         taxable = subtotal − discount ──► tax                           │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │     total = taxable + tax + delivery fee (untaxed)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::PricedItem;
use crate::promotion::{best_promotion, AppliedPromotion};
use crate::types::{ItemKind, MenuItem, Promotion, TaxRate};
use crate::validation::validate_quantity;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One configured item in the cart.
///
/// Name, kind and the priced configuration are frozen when the line is built.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub line_id: String,
    pub menu_item_id: String,
    pub name: String,
    pub kind: ItemKind,
    pub priced: PricedItem,
    pub quantity: i64,
    pub special_instructions: Option<String>,
}

impl CartLine {
    /// Builds a line for `item` configured as `priced`.
    pub fn new(
        item: &MenuItem,
        priced: PricedItem,
        quantity: i64,
        special_instructions: Option<String>,
    ) -> Self {
        CartLine {
            line_id: Uuid::new_v4().to_string(),
            menu_item_id: item.id.clone(),
            name: item.name.clone(),
            kind: item.kind,
            priced,
            quantity,
            special_instructions: special_instructions
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.priced.unit_price().multiply_quantity(self.quantity)
    }

    /// Same item, same options, same instructions.
    fn same_configuration(&self, other: &CartLine) -> bool {
        self.menu_item_id == other.menu_item_id
            && self.special_instructions == other.special_instructions
            && self.priced.selection_key() == other.priced.selection_key()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines with an identical configuration are merged (quantity adds up)
/// - Line quantity is within `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_LINES` lines
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a line, merging it into an existing identical line.
    ///
    /// ## Returns
    /// The id of the line that now holds the item.
    pub fn add_line(&mut self, line: CartLine) -> CoreResult<String> {
        validate_quantity(line.quantity)?;

        if let Some(existing) = self.lines.iter_mut().find(|l| l.same_configuration(&line)) {
            let new_qty = existing.quantity + line.quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            existing.quantity = new_qty;
            return Ok(existing.line_id.clone());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        let line_id = line.line_id.clone();
        self.lines.push(line);
        Ok(line_id)
    }

    /// Sets a line's quantity; 0 removes it.
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(line_id);
        }

        validate_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.line_id == line_id)
            .ok_or_else(|| CoreError::CartLineNotFound(line_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by id.
    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.line_id != line_id);

        if self.lines.len() == initial_len {
            Err(CoreError::CartLineNotFound(line_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line totals, before discounts and tax.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// One entry per pizza unit, for the pizza pair promotion.
    pub fn pizza_unit_prices(&self) -> Vec<Money> {
        self.lines
            .iter()
            .filter(|l| l.kind == ItemKind::Pizza)
            .flat_map(|l| std::iter::repeat(l.priced.unit_price()).take(l.quantity.max(0) as usize))
            .collect()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Everything the checkout screen shows under the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub promotion: Option<AppliedPromotion>,
    pub taxable_cents: i64,
    pub tax_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
}

impl CartTotals {
    /// Computes totals with the best live promotion applied.
    ///
    /// ## Arguments
    /// * `promotions` - candidate promotions (inactive / expired ones are skipped)
    /// * `tax_rate` - store tax rate
    /// * `delivery_fee` - zero for pickup orders
    /// * `now` - evaluation time for promotion windows
    pub fn compute(
        cart: &Cart,
        promotions: &[Promotion],
        tax_rate: TaxRate,
        delivery_fee: Money,
        now: DateTime<Utc>,
    ) -> Self {
        let subtotal = cart.subtotal();
        let promotion = if cart.is_empty() {
            None
        } else {
            best_promotion(promotions, &cart.pizza_unit_prices(), subtotal, now)
        };
        let discount = promotion
            .as_ref()
            .map(AppliedPromotion::discount)
            .unwrap_or_default();

        let taxable = (subtotal - discount).non_negative();
        let tax = taxable.calculate_tax(tax_rate);
        let total = taxable + tax + delivery_fee;

        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal_cents: subtotal.cents(),
            discount_cents: discount.cents(),
            promotion,
            taxable_cents: taxable.cents(),
            tax_cents: tax.cents(),
            delivery_fee_cents: delivery_fee.cents(),
            total_cents: total.cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
