//! # Domain Types
//!
//! Core domain types used throughout the pizzeria backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────┐        ┌──────────────────────┐   │
//! │  │  Category    │1─*│  MenuItem    │*──────*│ CustomizationGroup   │   │
//! │  │  "Pizzas"    │   │  base_price  │ (join) │  SINGLE / MULTI      │   │
//! │  └──────────────┘   └──────────────┘        │  min / max           │   │
//! │                                             └──────────┬───────────┘   │
//! │                                                        │1─*             │
//! │                                             ┌──────────▼───────────┐   │
//! │                                             │ CustomizationOption  │   │
//! │                                             │  price_modifier      │   │
//! │                                             │  is_default          │   │
//! │                                             └──────────────────────┘   │
//! │                                                                         │
//! │  ┌──────────────┐1─*┌──────────────┐1─*┌──────────────────────────┐    │
//! │  │    Order     │───│  OrderItem   │───│ OrderItemCustomization   │    │
//! │  │  status      │   │  (snapshot)  │   │  (snapshot)              │    │
//! │  └──────────────┘   └──────────────┘   └──────────────────────────┘    │
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────┐                                   │
//! │  │  Promotion   │   │  Customer    │                                   │
//! │  └──────────────┘   └──────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids are UUID v4 strings. Everything a customer can see carries `is_active`
//! for soft delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 825 bps = 8.25%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Menu
// =============================================================================

/// What kind of thing a menu item is.
///
/// The pizza pair promotion only looks at `Pizza` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Pizza,
    Calzone,
    Sub,
    Sandwich,
    Salad,
    Side,
    Drink,
    Dessert,
}

impl ItemKind {
    /// Database / URL representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Pizza => "pizza",
            ItemKind::Calzone => "calzone",
            ItemKind::Sub => "sub",
            ItemKind::Sandwich => "sandwich",
            ItemKind::Salad => "salad",
            ItemKind::Side => "side",
            ItemKind::Drink => "drink",
            ItemKind::Dessert => "dessert",
        }
    }
}

/// A menu section ("Pizzas", "Subs", "Drinks").
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Something a customer can order.
///
/// Specialty pizzas and calzones are ordinary items with `is_specialty`
/// set: their toppings are baked into `base_price_cents`, and the same
/// customization groups still apply on top.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: ItemKind,
    /// Price before customizations, in cents.
    pub base_price_cents: i64,
    pub image_url: Option<String>,
    pub is_specialty: bool,
    pub is_active: bool,
    pub sort_order: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Returns the base price as Money.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_cents(self.base_price_cents)
    }
}

// =============================================================================
// Customization
// =============================================================================

/// How many options of a group a customer may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionType {
    /// Exactly zero or one option ("Crust", "Bread Type").
    SingleSelect,
    /// Any number up to `max_selections` ("Toppings").
    MultiSelect,
}

/// A named set of options, e.g. "Bread Type" or "Toppings".
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomizationGroup {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub selection_type: SelectionType,
    /// Shorthand for `min_selections >= 1`.
    pub is_required: bool,
    pub min_selections: i64,
    /// `None` means unlimited (multi-select only).
    pub max_selections: Option<i64>,
    pub sort_order: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CustomizationGroup {
    /// Effective minimum number of distinct options.
    pub fn effective_min(&self) -> i64 {
        if self.is_required {
            self.min_selections.max(1)
        } else {
            self.min_selections.max(0)
        }
    }

    /// Effective maximum number of distinct options.
    pub fn effective_max(&self) -> Option<i64> {
        match self.selection_type {
            SelectionType::SingleSelect => Some(1),
            SelectionType::MultiSelect => self.max_selections,
        }
    }
}

/// One choice inside a group.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomizationOption {
    pub id: String,
    pub group_id: String,
    pub name: String,
    /// Added to the item price per unit of quantity. May be zero or negative.
    pub price_modifier_cents: i64,
    pub is_default: bool,
    pub is_active: bool,
    pub sort_order: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CustomizationOption {
    /// Returns the price modifier as Money.
    #[inline]
    pub fn price_modifier(&self) -> Money {
        Money::from_cents(self.price_modifier_cents)
    }

    /// Free options never change the price.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.price_modifier_cents == 0
    }
}

/// A group as attached to a menu item, with its options.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GroupWithOptions {
    pub group: CustomizationGroup,
    pub options: Vec<CustomizationOption>,
}

// =============================================================================
// Orders
// =============================================================================

/// Where an order is in the kitchen.
///
/// See [`crate::kitchen`] for the allowed transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl OrderStatus {
    /// Database / query-string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: [
                    "pending",
                    "confirmed",
                    "preparing",
                    "ready",
                    "completed",
                    "cancelled",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            }),
        }
    }
}

/// Pickup at the counter or delivery to an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Pickup,
    Delivery,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::Pickup
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Human-facing number read out at the counter (`YYMMDD-NNNN`).
    pub order_number: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub order_type: OrderType,
    pub delivery_address: Option<String>,
    pub status: OrderStatus,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    pub promotion_id: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line of an order. Uses the snapshot pattern: name and prices are frozen
/// at checkout so later menu edits don't rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub name_snapshot: String,
    pub base_price_cents: i64,
    /// Base price plus customizations, for one unit.
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
    pub special_instructions: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// A chosen option on an order line (snapshot).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItemCustomization {
    pub id: String,
    pub order_item_id: String,
    pub option_id: String,
    pub group_name_snapshot: String,
    pub option_name_snapshot: String,
    pub price_modifier_cents: i64,
    pub quantity: i64,
}

// =============================================================================
// Promotions
// =============================================================================

/// How a promotion computes its discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PromotionKind {
    /// Pizzas are paired most-expensive-first; the cheaper of each pair gets
    /// `value` bps off.
    PizzaPairHalfOff,
    /// `value` bps off the subtotal.
    PercentOff,
    /// `value` cents off the subtotal.
    FixedAmountOff,
}

/// A store promotion.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Promotion {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: PromotionKind,
    /// Basis points for percentage kinds, cents for `FixedAmountOff`.
    pub value: i64,
    pub min_subtotal_cents: i64,
    #[ts(as = "Option<String>")]
    pub starts_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Promotion {
    /// Active and inside its (optional) date window.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(starts_at) = self.starts_at {
            if now < starts_at {
                return false;
            }
        }
        if let Some(ends_at) = self.ends_at {
            if now >= ends_at {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// Customers
// =============================================================================

/// A customer, keyed by phone number.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub order_count: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn promotion(is_active: bool) -> Promotion {
        let now = Utc::now();
        Promotion {
            id: "promo-1".to_string(),
            name: "Two Pizza Tuesday".to_string(),
            description: None,
            kind: PromotionKind::PizzaPairHalfOff,
            value: 5000,
            min_subtotal_cents: 0,
            starts_at: None,
            ends_at: None,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
    }

    #[test]
    fn test_order_status_round_trips_through_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert_eq!("Canceled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!("baking".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_selection_type_json_shape() {
        let json = serde_json::to_string(&SelectionType::SingleSelect).unwrap();
        assert_eq!(json, "\"SINGLE_SELECT\"");
        let parsed: SelectionType = serde_json::from_str("\"MULTI_SELECT\"").unwrap();
        assert_eq!(parsed, SelectionType::MultiSelect);
    }

    #[test]
    fn test_promotion_window() {
        let now = Utc::now();
        let mut promo = promotion(true);
        assert!(promo.is_live_at(now));

        promo.starts_at = Some(now + Duration::hours(1));
        assert!(!promo.is_live_at(now));

        promo.starts_at = Some(now - Duration::hours(2));
        promo.ends_at = Some(now - Duration::hours(1));
        assert!(!promo.is_live_at(now));

        assert!(!promotion(false).is_live_at(now));
    }
}
