//! # Kitchen
//!
//! Order status machine and the kitchen display queue.
//!
//! ## Status Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   pending ──► confirmed ──► preparing ──► ready ──► completed           │
//! │      │            │             │           │                           │
//! │      └────────────┴─────────────┴───────────┴──► cancelled              │
//! │                                                                         │
//! │   • forward one step at a time                                          │
//! │   • any non-terminal status can be cancelled                            │
//! │   • completed / cancelled are final                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The kitchen display polls for its queue; there is no push channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{Order, OrderItem, OrderItemCustomization, OrderStatus, OrderType};

// =============================================================================
// Status Machine
// =============================================================================

impl OrderStatus {
    /// The status that follows this one on the happy path.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Completed),
            OrderStatus::Completed | OrderStatus::Cancelled => None,
        }
    }

    /// Completed and cancelled orders never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Statuses shown on the kitchen display.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Checks whether `next` is a legal move from this status.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == OrderStatus::Cancelled || self.next() == Some(next)
    }
}

/// Moves `order` to `next`, stamping `updated_at` (and `completed_at` when
/// the order is completed).
pub fn transition(order: &mut Order, next: OrderStatus, now: DateTime<Utc>) -> CoreResult<()> {
    if !order.status.can_transition_to(next) {
        return Err(CoreError::InvalidStatusTransition {
            order_id: order.order_number.clone(),
            from: order.status.to_string(),
            to: next.to_string(),
        });
    }

    order.status = next;
    order.updated_at = now;
    if next == OrderStatus::Completed {
        order.completed_at = Some(now);
    }

    Ok(())
}

// =============================================================================
// Kitchen Tickets
// =============================================================================

/// One line on a kitchen ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct KitchenTicketItem {
    pub name: String,
    pub quantity: i64,
    /// e.g. `"Toppings: Pepperoni x2"`
    pub customizations: Vec<String>,
    pub special_instructions: Option<String>,
}

/// What the kitchen display shows for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct KitchenTicket {
    pub order_id: String,
    pub order_number: String,
    pub customer_name: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub items: Vec<KitchenTicketItem>,
    pub minutes_waiting: i64,
    pub is_late: bool,
}

impl KitchenTicket {
    /// Builds a ticket from an order and its rows.
    ///
    /// `customizations` may hold rows for every item of the order; each item
    /// picks its own by `order_item_id`.
    pub fn new(
        order: &Order,
        items: &[OrderItem],
        customizations: &[OrderItemCustomization],
        now: DateTime<Utc>,
        late_after_minutes: i64,
    ) -> Self {
        let items = items
            .iter()
            .map(|item| KitchenTicketItem {
                name: item.name_snapshot.clone(),
                quantity: item.quantity,
                customizations: customizations
                    .iter()
                    .filter(|c| c.order_item_id == item.id)
                    .map(describe_customization)
                    .collect(),
                special_instructions: item.special_instructions.clone(),
            })
            .collect();

        let mut ticket = KitchenTicket {
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            customer_name: order.customer_name.clone(),
            order_type: order.order_type,
            status: order.status,
            notes: order.notes.clone(),
            created_at: order.created_at,
            items,
            minutes_waiting: 0,
            is_late: false,
        };
        ticket.minutes_waiting = ticket.minutes_waiting_at(now);
        ticket.is_late = ticket.is_late_at(now, late_after_minutes);
        ticket
    }

    /// Whole minutes since the order was placed (never negative).
    pub fn minutes_waiting_at(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_minutes().max(0)
    }

    /// An order not yet ready after `threshold_minutes` is late.
    pub fn is_late_at(&self, now: DateTime<Utc>, threshold_minutes: i64) -> bool {
        self.status != OrderStatus::Ready
            && self.status.is_active()
            && self.minutes_waiting_at(now) >= threshold_minutes
    }
}

fn describe_customization(c: &OrderItemCustomization) -> String {
    if c.quantity > 1 {
        format!("{}: {} x{}", c.group_name_snapshot, c.option_name_snapshot, c.quantity)
    } else {
        format!("{}: {}", c.group_name_snapshot, c.option_name_snapshot)
    }
}

/// Active orders, oldest first.
pub fn kitchen_queue(orders: impl IntoIterator<Item = Order>) -> Vec<Order> {
    let mut queue: Vec<Order> = orders
        .into_iter()
        .filter(|o| o.status.is_active())
        .collect();
    queue.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.order_number.cmp(&b.order_number))
    });
    queue
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    fn order(number: &str, status: OrderStatus, created_at: DateTime<Utc>) -> Order {
        Order {
            id: format!("id-{number}"),
            order_number: number.to_string(),
            customer_id: None,
            customer_name: "Carmela".to_string(),
            customer_phone: "5551234567".to_string(),
            customer_email: None,
            order_type: OrderType::Pickup,
            delivery_address: None,
            status,
            subtotal_cents: 1499,
            discount_cents: 0,
            tax_cents: 0,
            delivery_fee_cents: 0,
            total_cents: 1499,
            promotion_id: None,
            notes: None,
            created_at,
            updated_at: created_at,
            completed_at: None,
        }
    }

    #[test]
    fn test_forward_one_step_only() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Preparing));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Completed));

        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Preparing));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in ALL {
            assert!(!OrderStatus::Completed.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_any_active_status_can_cancel() {
        for status in ALL.into_iter().filter(|s| s.is_active()) {
            assert!(status.can_transition_to(OrderStatus::Cancelled), "{status}");
        }
    }

    #[test]
    fn test_transition_sets_completed_at() {
        let now = Utc::now();
        let mut o = order("0001", OrderStatus::Ready, now - Duration::minutes(10));

        transition(&mut o, OrderStatus::Completed, now).unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
        assert_eq!(o.completed_at, Some(now));
        assert_eq!(o.updated_at, now);

        let err = transition(&mut o, OrderStatus::Cancelled, now).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Order 0001 cannot move from completed to cancelled"
        );
    }

    #[test]
    fn test_kitchen_queue_filters_and_sorts() {
        let now = Utc::now();
        let orders = vec![
            order("c", OrderStatus::Preparing, now - Duration::minutes(5)),
            order("done", OrderStatus::Completed, now - Duration::minutes(50)),
            order("a", OrderStatus::Pending, now - Duration::minutes(20)),
            order("x", OrderStatus::Cancelled, now - Duration::minutes(30)),
            order("b", OrderStatus::Ready, now - Duration::minutes(10)),
        ];

        let numbers: Vec<String> = kitchen_queue(orders)
            .into_iter()
            .map(|o| o.order_number)
            .collect();
        assert_eq!(numbers, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ticket_lateness_and_customizations() {
        let now = Utc::now();
        let o = order("0042", OrderStatus::Preparing, now - Duration::minutes(25));
        let item = OrderItem {
            id: "item-1".to_string(),
            order_id: o.id.clone(),
            menu_item_id: "pizza".to_string(),
            name_snapshot: "Large Cheese".to_string(),
            base_price_cents: 1499,
            unit_price_cents: 1849,
            quantity: 1,
            line_total_cents: 1849,
            special_instructions: Some("well done".to_string()),
            created_at: o.created_at,
        };
        let customizations = vec![
            OrderItemCustomization {
                id: "c1".to_string(),
                order_item_id: "item-1".to_string(),
                option_id: "pep".to_string(),
                group_name_snapshot: "Toppings".to_string(),
                option_name_snapshot: "Pepperoni".to_string(),
                price_modifier_cents: 175,
                quantity: 2,
            },
            OrderItemCustomization {
                id: "c2".to_string(),
                order_item_id: "other-item".to_string(),
                option_id: "x".to_string(),
                group_name_snapshot: "Bread".to_string(),
                option_name_snapshot: "Wheat".to_string(),
                price_modifier_cents: 0,
                quantity: 1,
            },
        ];

        let ticket = KitchenTicket::new(&o, &[item], &customizations, now, 20);
        assert_eq!(ticket.minutes_waiting, 25);
        assert!(ticket.is_late);
        assert_eq!(ticket.items[0].customizations, vec!["Toppings: Pepperoni x2"]);

        // Ready orders are waiting on the customer, not the kitchen
        let ready = order("0043", OrderStatus::Ready, now - Duration::minutes(25));
        let ticket = KitchenTicket::new(&ready, &[], &[], now, 20);
        assert!(!ticket.is_late);
    }
}
