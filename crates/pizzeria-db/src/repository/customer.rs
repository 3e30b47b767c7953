//! # Customer Repository
//!
//! Customers are created implicitly at checkout and keyed by their
//! normalized phone number. There are no accounts or passwords.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use pizzeria_core::Customer;

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, order_count, created_at, updated_at";

/// Repository for customer records.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates or refreshes the customer with this phone number.
    ///
    /// The latest name wins; an email is only overwritten when a new one is
    /// given.
    ///
    /// ## Returns
    /// The customer's id.
    pub async fn upsert_by_phone(
        &self,
        name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> DbResult<String> {
        let mut conn = self.pool.acquire().await?;
        upsert_by_phone(&mut *conn, name, phone, email, Utc::now()).await
    }

    /// Gets a customer by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Gets a customer by normalized phone number.
    pub async fn get_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = ?1");

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Lists customers, most recently active first.
    pub async fn list(&self, limit: u32, offset: u32) -> DbResult<Vec<Customer>> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers
             ORDER BY updated_at DESC, name
             LIMIT ?1 OFFSET ?2"
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }
}

/// Upsert on an existing connection, so checkout can run it inside its
/// transaction.
pub(crate) async fn upsert_by_phone(
    conn: &mut SqliteConnection,
    name: &str,
    phone: &str,
    email: Option<&str>,
    now: DateTime<Utc>,
) -> DbResult<String> {
    debug!(phone = %phone, "Upserting customer");

    let id: String = sqlx::query_scalar(
        r#"
        INSERT INTO customers (id, name, phone, email, order_count, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
        ON CONFLICT (phone) DO UPDATE SET
            name = excluded.name,
            email = COALESCE(excluded.email, customers.email),
            updated_at = excluded.updated_at
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(name)
    .bind(phone)
    .bind(email)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::repository::test_support::test_db;

    #[tokio::test]
    async fn test_upsert_by_phone_reuses_customer() {
        let db = test_db().await;
        let repo = db.customers();

        let first = repo
            .upsert_by_phone("Paulie", "5551234567", Some("paulie@example.com"))
            .await
            .unwrap();
        let second = repo
            .upsert_by_phone("Paulie Walnuts", "5551234567", None)
            .await
            .unwrap();
        assert_eq!(first, second);

        let customer = repo.get(&first).await.unwrap().unwrap();
        assert_eq!(customer.name, "Paulie Walnuts");
        assert_eq!(customer.email.as_deref(), Some("paulie@example.com"));
        assert_eq!(customer.order_count, 0);

        let by_phone = repo.get_by_phone("5551234567").await.unwrap().unwrap();
        assert_eq!(by_phone.id, first);
    }

    #[tokio::test]
    async fn test_list_customers() {
        let db = test_db().await;
        let repo = db.customers();

        repo.upsert_by_phone("A", "5550000001", None).await.unwrap();
        repo.upsert_by_phone("B", "5550000002", None).await.unwrap();
        repo.upsert_by_phone("C", "5550000003", None).await.unwrap();

        assert_eq!(repo.list(10, 0).await.unwrap().len(), 3);
        assert_eq!(repo.list(2, 0).await.unwrap().len(), 2);
        assert_eq!(repo.list(10, 2).await.unwrap().len(), 1);
        assert!(repo.get("missing").await.unwrap().is_none());
    }
}
