//! # Order Repository
//!
//! Saving orders at checkout, looking them up, and moving them through the
//! kitchen.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    1. order_sequences: claim today's next number   → 250314-0007        │
//! │    2. customers: upsert by phone                   → customer_id        │
//! │    3. orders: insert                                                    │
//! │    4. order_items + order_item_customizations: insert snapshots         │
//! │    5. customers.order_count += 1                                        │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls everything back; no half-written orders.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sequence claim is a single upsert statement and the first write of
//! the transaction, so concurrent checkouts queue on SQLite's write lock
//! and never share a number.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::customer;
use pizzeria_core::kitchen::kitchen_queue;
use pizzeria_core::order::{generate_order_number, NewOrder};
use pizzeria_core::{Order, OrderItem, OrderItemCustomization, OrderStatus};

const ORDER_COLUMNS: &str = "id, order_number, customer_id, customer_name, customer_phone, \
     customer_email, order_type, delivery_address, status, subtotal_cents, discount_cents, \
     tax_cents, delivery_fee_cents, total_cents, promotion_id, notes, created_at, updated_at, \
     completed_at";

const ITEM_COLUMNS: &str = "id, order_id, menu_item_id, name_snapshot, base_price_cents, \
     unit_price_cents, quantity, line_total_cents, special_instructions, created_at";

/// Repository for orders and their lines.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Saves a new order in one transaction (see module docs).
    ///
    /// ## Returns
    /// The stored order, with its order number and customer id filled in.
    pub async fn create(&self, new_order: NewOrder) -> DbResult<Order> {
        let NewOrder { mut order, lines } = new_order;

        let mut tx = self.pool.begin().await?;

        let seq = claim_sequence(&mut tx, order.created_at).await?;
        order.order_number = generate_order_number(order.created_at, seq);

        let customer_id = customer::upsert_by_phone(
            &mut tx,
            &order.customer_name,
            &order.customer_phone,
            order.customer_email.as_deref(),
            order.created_at,
        )
        .await?;
        order.customer_id = Some(customer_id.clone());

        debug!(id = %order.id, order_number = %order.order_number, "Creating order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, customer_id, customer_name, customer_phone,
                customer_email, order_type, delivery_address, status,
                subtotal_cents, discount_cents, tax_cents, delivery_fee_cents, total_cents,
                promotion_id, notes, created_at, updated_at, completed_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13, ?14,
                ?15, ?16, ?17, ?18, ?19
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.customer_id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_email)
        .bind(order.order_type)
        .bind(&order.delivery_address)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.tax_cents)
        .bind(order.delivery_fee_cents)
        .bind(order.total_cents)
        .bind(&order.promotion_id)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.completed_at)
        .execute(&mut *tx)
        .await?;

        for line in &lines {
            insert_item(&mut tx, &line.item).await?;
            for customization in &line.customizations {
                insert_customization(&mut tx, customization).await?;
            }
        }

        sqlx::query("UPDATE customers SET order_count = order_count + 1 WHERE id = ?1")
            .bind(&customer_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            order_number = %order.order_number,
            total_cents = order.total_cents,
            lines = lines.len(),
            "Order placed"
        );

        Ok(order)
    }

    /// Gets an order by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets an order by its human-facing number (`YYMMDD-NNNN`).
    pub async fn get_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = ?1");

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets the lines of an order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items
             WHERE order_id = ?1
             ORDER BY created_at, rowid"
        );

        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Gets the customizations of every line of an order.
    pub async fn get_item_customizations(
        &self,
        order_id: &str,
    ) -> DbResult<Vec<OrderItemCustomization>> {
        let customizations = sqlx::query_as::<_, OrderItemCustomization>(
            r#"
            SELECT c.id, c.order_item_id, c.option_id, c.group_name_snapshot,
                   c.option_name_snapshot, c.price_modifier_cents, c.quantity
            FROM order_item_customizations c
            INNER JOIN order_items i ON i.id = c.order_item_id
            WHERE i.order_id = ?1
            ORDER BY i.rowid, c.rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customizations)
    }

    /// Lists orders, newest first.
    ///
    /// ## Arguments
    /// * `status` - `None` lists every status
    /// * `limit` / `offset` - paging
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: u32,
        offset: u32,
    ) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY created_at DESC, order_number DESC
             LIMIT ?2 OFFSET ?3"
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Orders the kitchen still has to deal with, oldest first.
    pub async fn kitchen_orders(&self) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE status IN ('pending', 'confirmed', 'preparing', 'ready')
             ORDER BY created_at"
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(kitchen_queue(orders))
    }

    /// Persists a status change made with `kitchen::transition`.
    ///
    /// The update only applies while the row still has `expected` status;
    /// if another screen moved the order first this returns
    /// `DbError::Conflict` and nothing changes.
    pub async fn update_status(&self, order: &Order, expected: OrderStatus) -> DbResult<()> {
        debug!(
            order_number = %order.order_number,
            from = %expected,
            to = %order.status,
            "Updating order status"
        );

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?2,
                updated_at = ?3,
                completed_at = ?4
            WHERE id = ?1 AND status = ?5
            "#,
        )
        .bind(&order.id)
        .bind(order.status)
        .bind(order.updated_at)
        .bind(order.completed_at)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get(&order.id).await? {
                None => Err(DbError::not_found("Order", &order.id)),
                Some(current) => Err(DbError::Conflict(format!(
                    "order {} is now {}",
                    current.order_number, current.status
                ))),
            };
        }

        Ok(())
    }

    /// The sequence number the next order placed on `now`'s day would get.
    pub async fn next_sequence_for_day(&self, now: DateTime<Utc>) -> DbResult<u32> {
        let last: Option<i64> =
            sqlx::query_scalar("SELECT last_seq FROM order_sequences WHERE day = ?1")
                .bind(day_key(now))
                .fetch_optional(&self.pool)
                .await?;

        to_seq(last.unwrap_or(0) + 1)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

fn day_key(now: DateTime<Utc>) -> String {
    now.format("%y%m%d").to_string()
}

fn to_seq(value: i64) -> DbResult<u32> {
    u32::try_from(value).map_err(|_| DbError::Internal(format!("order sequence out of range: {value}")))
}

async fn claim_sequence(conn: &mut SqliteConnection, now: DateTime<Utc>) -> DbResult<u32> {
    let seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO order_sequences (day, last_seq) VALUES (?1, 1)
        ON CONFLICT (day) DO UPDATE SET last_seq = last_seq + 1
        RETURNING last_seq
        "#,
    )
    .bind(day_key(now))
    .fetch_one(&mut *conn)
    .await?;

    to_seq(seq)
}

async fn insert_item(conn: &mut SqliteConnection, item: &OrderItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, menu_item_id, name_snapshot, base_price_cents,
            unit_price_cents, quantity, line_total_cents, special_instructions, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.menu_item_id)
    .bind(&item.name_snapshot)
    .bind(item.base_price_cents)
    .bind(item.unit_price_cents)
    .bind(item.quantity)
    .bind(item.line_total_cents)
    .bind(&item.special_instructions)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_customization(
    conn: &mut SqliteConnection,
    customization: &OrderItemCustomization,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_item_customizations (
            id, order_item_id, option_id, group_name_snapshot,
            option_name_snapshot, price_modifier_cents, quantity
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&customization.id)
    .bind(&customization.order_item_id)
    .bind(&customization.option_id)
    .bind(&customization.group_name_snapshot)
    .bind(&customization.option_name_snapshot)
    .bind(customization.price_modifier_cents)
    .bind(customization.quantity)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
