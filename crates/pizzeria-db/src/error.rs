//! # Database Errors
//!
//! SQLite failures sorted by what the storefront and admin screens need to
//! tell the user.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite / sqlx                      DbError              HTTP (api)     │
//! │                                                                         │
//! │  UNIQUE categories.name         ──► UniqueViolation      409            │
//! │  FOREIGN KEY (item → category)  ──► ForeignKeyViolation  409            │
//! │  CHECK / NOT NULL               ──► CheckViolation       400            │
//! │  guarded status UPDATE lost     ──► Conflict             409            │
//! │  rows_affected == 0             ──► NotFound             404            │
//! │  pool / migration / other       ──► logged               500            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// `field` is SQLite's `table.column`; `value` is filled in by the
    /// repository when it knows what the caller tried to store.
    #[error("{}", duplicate_message(.field, .value))]
    UniqueViolation { field: String, value: Option<String> },

    /// Unknown category / group on insert, or a category that still has
    /// items on delete.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A schema CHECK caught a value that got past validation.
    #[error("Constraint failed: {message}")]
    CheckViolation { message: String },

    /// Two kitchen screens moved the same order at once.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

fn duplicate_message(field: &str, value: &Option<String>) -> String {
    match value {
        Some(value) => format!("{field} '{value}' already exists"),
        None => format!("{field} already exists"),
    }
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: Some(value.into()),
        }
    }

    /// Names the rejected value on a unique violation; other errors pass
    /// through untouched.
    ///
    /// ```rust,ignore
    /// .execute(&self.pool)
    /// .await
    /// .map_err(|e| DbError::from(e).with_value(&category.name))?;
    /// ```
    pub fn with_value(self, value: impl Into<String>) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: Some(value.into()),
            },
            other => other,
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    // "UNIQUE constraint failed: categories.name"
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        field: message
                            .split_once(": ")
                            .map_or_else(|| message.clone(), |(_, field)| field.to_string()),
                        value: None,
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        DbError::CheckViolation { message }
                    }
                    _ => DbError::QueryFailed(message),
                }
            }
            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionFailed("timed out waiting for a connection".to_string())
            }
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::not_found("Order", "abc").to_string(),
            "Order not found: abc"
        );
        assert_eq!(
            DbError::duplicate("categories.name", "Pizza").to_string(),
            "categories.name 'Pizza' already exists"
        );
    }

    #[test]
    fn test_with_value_only_touches_unique_violations() {
        let err = DbError::UniqueViolation {
            field: "categories.name".to_string(),
            value: None,
        };
        assert_eq!(err.to_string(), "categories.name already exists");
        assert_eq!(
            err.with_value("Subs").to_string(),
            "categories.name 'Subs' already exists"
        );

        let err = DbError::Conflict("order moved".to_string()).with_value("Subs");
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_constraint_failures_are_classified() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let insert = "INSERT INTO categories (id, name, sort_order, is_active, created_at, updated_at)
                      VALUES (?1, 'Pizza', 0, 1, 'now', 'now')";

        sqlx::query(insert).bind("a").execute(db.pool()).await.unwrap();
        let err = sqlx::query(insert).bind("b").execute(db.pool()).await.unwrap_err();
        match DbError::from(err) {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "categories.name");
                assert_eq!(value, None);
            }
            other => panic!("expected a unique violation, got {other:?}"),
        }

        let err = sqlx::query(
            "INSERT INTO menu_items (id, category_id, name, kind, base_price_cents, created_at, updated_at)
             VALUES ('i', 'a', 'Cheese', 'pizza', -1, 'now', 'now')",
        )
        .execute(db.pool())
        .await
        .unwrap_err();
        assert!(matches!(DbError::from(err), DbError::CheckViolation { .. }));
    }
}
