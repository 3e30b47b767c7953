//! # Orders
//!
//! Checkout validation and turning a priced cart into order rows.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutRequest ──► validate_checkout ──► normalized details           │
//! │                                                 │                       │
//! │  Cart + CartTotals ─────────────────────────────┤                       │
//! │                                                 ▼                       │
//! │                               build_order(cart, totals, details, now)   │
//! │                                                 │                       │
//! │                                                 ▼                       │
//! │            NewOrder { order, lines: [item + customizations] }           │
//! │                                                 │                       │
//! │                                                 ▼                       │
//! │                          pizzeria-db: one transaction                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Item names, option names and prices are copied onto the order rows.
//! Editing the menu later never rewrites an order that was already placed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{Cart, CartTotals};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Order, OrderItem, OrderItemCustomization, OrderStatus, OrderType};
use crate::validation::{
    validate_email, validate_name, validate_optional_text, validate_phone, ValidationResult,
    MAX_NOTE_LEN,
};

// =============================================================================
// Checkout Details
// =============================================================================

/// Who is ordering and how they get the food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validates and normalizes checkout details.
///
/// ## Rules
/// - Name is required (max 100 characters)
/// - Phone is normalized to digits (see [`validate_phone`])
/// - Email is optional; when given it must be well-formed
/// - Delivery orders need an address; pickup orders drop any address sent
pub fn validate_checkout(details: &CheckoutRequest) -> ValidationResult<CheckoutRequest> {
    let customer_name = validate_name("customerName", &details.customer_name, 100)?;
    let customer_phone = validate_phone(&details.customer_phone)?;

    let customer_email = match details
        .customer_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
    {
        Some(email) => Some(validate_email(email)?),
        None => None,
    };

    let delivery_address = match details.order_type {
        OrderType::Delivery => {
            let address =
                validate_optional_text("deliveryAddress", details.delivery_address.as_deref(), 300)?;
            Some(address.ok_or_else(|| ValidationError::Required {
                field: "deliveryAddress".to_string(),
            })?)
        }
        OrderType::Pickup => None,
    };

    let notes = validate_optional_text("notes", details.notes.as_deref(), MAX_NOTE_LEN)?;

    Ok(CheckoutRequest {
        customer_name,
        customer_phone,
        customer_email,
        order_type: details.order_type,
        delivery_address,
        notes,
    })
}

// =============================================================================
// Order Construction
// =============================================================================

/// An order line ready to be inserted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewOrderLine {
    pub item: OrderItem,
    pub customizations: Vec<OrderItemCustomization>,
}

/// Everything needed to persist one order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewOrder {
    pub order: Order,
    pub lines: Vec<NewOrderLine>,
}

/// Builds order rows from a priced cart.
///
/// `details` should already have passed [`validate_checkout`]. The order
/// starts `pending` with an empty order number and no customer id; the
/// database layer assigns both in the transaction that saves the order.
pub fn build_order(
    cart: &Cart,
    totals: &CartTotals,
    details: &CheckoutRequest,
    now: DateTime<Utc>,
) -> CoreResult<NewOrder> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let order_id = Uuid::new_v4().to_string();

    let lines = cart
        .lines
        .iter()
        .map(|line| {
            let item_id = Uuid::new_v4().to_string();
            let customizations = line
                .priced
                .selections
                .iter()
                .map(|s| OrderItemCustomization {
                    id: Uuid::new_v4().to_string(),
                    order_item_id: item_id.clone(),
                    option_id: s.option_id.clone(),
                    group_name_snapshot: s.group_name.clone(),
                    option_name_snapshot: s.option_name.clone(),
                    price_modifier_cents: s.price_modifier_cents,
                    quantity: s.quantity,
                })
                .collect();

            NewOrderLine {
                item: OrderItem {
                    id: item_id,
                    order_id: order_id.clone(),
                    menu_item_id: line.menu_item_id.clone(),
                    name_snapshot: line.name.clone(),
                    base_price_cents: line.priced.base_price_cents,
                    unit_price_cents: line.priced.unit_price_cents,
                    quantity: line.quantity,
                    line_total_cents: line.line_total().cents(),
                    special_instructions: line.special_instructions.clone(),
                    created_at: now,
                },
                customizations,
            }
        })
        .collect();

    let delivery_fee_cents = match details.order_type {
        OrderType::Delivery => totals.delivery_fee_cents,
        OrderType::Pickup => 0,
    };
    let total_cents = totals.total_cents - totals.delivery_fee_cents + delivery_fee_cents;

    let order = Order {
        id: order_id,
        order_number: String::new(),
        customer_id: None,
        customer_name: details.customer_name.clone(),
        customer_phone: details.customer_phone.clone(),
        customer_email: details.customer_email.clone(),
        order_type: details.order_type,
        delivery_address: details.delivery_address.clone(),
        status: OrderStatus::Pending,
        subtotal_cents: totals.subtotal_cents,
        discount_cents: totals.discount_cents,
        tax_cents: totals.tax_cents,
        delivery_fee_cents,
        total_cents,
        promotion_id: totals.promotion.as_ref().map(|p| p.promotion_id.clone()),
        notes: details.notes.clone(),
        created_at: now,
        updated_at: now,
        completed_at: None,
    };

    Ok(NewOrder { order, lines })
}

/// Formats an order number: `YYMMDD-NNNN`.
///
/// `seq` is the 1-based count of orders placed that day; past 9999 the
/// number simply grows wider.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use pizzeria_core::order::generate_order_number;
///
/// let now = Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 0).unwrap();
/// assert_eq!(generate_order_number(now, 7), "250314-0007");
/// ```
pub fn generate_order_number(now: DateTime<Utc>, seq: u32) -> String {
    format!("{}-{:04}", now.format("%y%m%d"), seq)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::pizza_line;
    use crate::money::Money;
    use crate::types::TaxRate;

    fn details(order_type: OrderType) -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "  Tony Soprano ".to_string(),
            customer_phone: "(555) 867-5309".to_string(),
            customer_email: Some("".to_string()),
            order_type,
            delivery_address: Some(" 14 Aspen Dr ".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_validate_checkout_normalizes() {
        let valid = validate_checkout(&details(OrderType::Delivery)).unwrap();
        assert_eq!(valid.customer_name, "Tony Soprano");
        assert_eq!(valid.customer_phone, "5558675309");
        assert_eq!(valid.customer_email, None);
        assert_eq!(valid.delivery_address.as_deref(), Some("14 Aspen Dr"));

        // Pickup drops the address
        let valid = validate_checkout(&details(OrderType::Pickup)).unwrap();
        assert_eq!(valid.delivery_address, None);
    }

    #[test]
    fn test_delivery_requires_address() {
        let mut request = details(OrderType::Delivery);
        request.delivery_address = Some("   ".to_string());
        assert_eq!(
            validate_checkout(&request),
            Err(ValidationError::Required {
                field: "deliveryAddress".to_string()
            })
        );
    }

    #[test]
    fn test_validate_checkout_rejects_bad_contact() {
        let mut request = details(OrderType::Pickup);
        request.customer_phone = "12345".to_string();
        assert!(validate_checkout(&request).is_err());

        let mut request = details(OrderType::Pickup);
        request.customer_email = Some("not-an-email".to_string());
        assert!(validate_checkout(&request).is_err());

        let mut request = details(OrderType::Pickup);
        request.customer_name = " ".to_string();
        assert!(validate_checkout(&request).is_err());
    }

    #[test]
    fn test_build_order_snapshots_lines() {
        let mut cart = Cart::new();
        cart.add_line(pizza_line("p1", 1499, &["pepperoni"], 2)).unwrap();
        let now = Utc::now();
        let totals = CartTotals::compute(&cart, &[], TaxRate::from_bps(1000), Money::zero(), now);
        let details = validate_checkout(&details(OrderType::Pickup)).unwrap();

        let new_order = build_order(&cart, &totals, &details, now).unwrap();

        assert_eq!(new_order.order.status, OrderStatus::Pending);
        assert_eq!(new_order.order.subtotal_cents, (1499 + 175) * 2);
        assert_eq!(new_order.order.total_cents, totals.total_cents);
        assert_eq!(new_order.lines.len(), 1);

        let line = &new_order.lines[0];
        assert_eq!(line.item.order_id, new_order.order.id);
        assert_eq!(line.item.unit_price_cents, 1499 + 175);
        assert_eq!(line.item.line_total_cents, (1499 + 175) * 2);
        // Default crust plus the chosen topping
        assert_eq!(line.customizations.len(), 2);
        assert!(line.customizations.iter().all(|c| c.order_item_id == line.item.id));
        assert!(line
            .customizations
            .iter()
            .any(|c| c.option_name_snapshot == "pepperoni" && c.price_modifier_cents == 175));
    }

    #[test]
    fn test_build_order_drops_delivery_fee_for_pickup() {
        let mut cart = Cart::new();
        cart.add_line(pizza_line("p1", 1000, &[], 1)).unwrap();
        let now = Utc::now();
        let totals =
            CartTotals::compute(&cart, &[], TaxRate::from_bps(0), Money::from_cents(300), now);
        let details = validate_checkout(&details(OrderType::Pickup)).unwrap();

        let new_order = build_order(&cart, &totals, &details, now).unwrap();
        assert_eq!(new_order.order.delivery_fee_cents, 0);
        assert_eq!(new_order.order.total_cents, 1000);
    }

    #[test]
    fn test_build_order_rejects_empty_cart() {
        let now = Utc::now();
        let cart = Cart::new();
        let totals = CartTotals::compute(&cart, &[], TaxRate::default(), Money::zero(), now);
        let details = validate_checkout(&details(OrderType::Pickup)).unwrap();
        assert!(matches!(
            build_order(&cart, &totals, &details, now),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_generate_order_number() {
        use chrono::TimeZone;
        let now = Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap();
        assert_eq!(generate_order_number(now, 1), "251201-0001");
        assert_eq!(generate_order_number(now, 12345), "251201-12345");
    }
}
