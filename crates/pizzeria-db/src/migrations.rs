//! # Database Migrations
//!
//! The pizzeria schema, embedded from `migrations/sqlite/` at compile time.
//!
//! ```text
//! categories ◄── menu_items ◄── menu_item_customization_groups ──► customization_groups
//!                    ▲                                                     ▲
//!                    │                                          customization_options
//!                    │                                                     ▲
//! customers ◄── orders ◄── order_items ◄── order_item_customizations ──────┘
//!
//! promotions        order_sequences (one row per business day)
//! ```
//!
//! Order rows snapshot names and prices, so menu rows are soft-deleted and the
//! references above stay valid. sqlx stores a checksum per applied file:
//! schema changes go in a new `NNN_*.sql`, never an edit to
//! `001_initial_schema.sql`.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every pending migration. Safe to call on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(
        embedded = MIGRATOR.migrations.len(),
        "Checking for pending migrations"
    );

    MIGRATOR.run(pool).await?;

    info!("Schema is up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts for the health endpoint.
///
/// A database that has never been migrated reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 =
        match sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await
        {
            Ok(count) => count,
            Err(sqlx::Error::Database(e)) if e.message().contains("no such table") => 0,
            Err(e) => return Err(e.into()),
        };

    Ok((total, usize::try_from(applied).unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_status_before_and_after_migrating() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert!(total >= 1);
        assert_eq!(applied, 0);

        db.run_migrations().await.unwrap();
        assert_eq!(migration_status(db.pool()).await.unwrap(), (total, total));

        // Second run is a no-op
        db.run_migrations().await.unwrap();
        assert_eq!(migration_status(db.pool()).await.unwrap(), (total, total));
    }
}
