//! # Promotion Repository
//!
//! Promotion CRUD. Whether a promotion is live is decided by
//! `Promotion::is_live_at` in pizzeria-core, not in SQL, so the storefront
//! and the tests agree on the window boundaries.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pizzeria_core::Promotion;

const PROMOTION_COLUMNS: &str = "id, name, description, kind, value, min_subtotal_cents, \
     starts_at, ends_at, is_active, created_at, updated_at";

/// Repository for promotions.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    /// Creates a new PromotionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Lists promotions, oldest first.
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Promotion>> {
        let sql = format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions
             WHERE (?1 OR is_active = 1)
             ORDER BY created_at, name"
        );

        let promotions = sqlx::query_as::<_, Promotion>(&sql)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;

        Ok(promotions)
    }

    /// Promotions that can apply to a cart at `now`.
    pub async fn list_live(&self, now: DateTime<Utc>) -> DbResult<Vec<Promotion>> {
        let live: Vec<Promotion> = self
            .list(false)
            .await?
            .into_iter()
            .filter(|p| p.is_live_at(now))
            .collect();

        debug!(count = live.len(), "Loaded live promotions");
        Ok(live)
    }

    /// Gets a promotion by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Promotion>> {
        let sql = format!("SELECT {PROMOTION_COLUMNS} FROM promotions WHERE id = ?1");

        let promotion = sqlx::query_as::<_, Promotion>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(promotion)
    }

    /// Inserts a new promotion.
    pub async fn insert(&self, promotion: &Promotion) -> DbResult<Promotion> {
        debug!(name = %promotion.name, "Inserting promotion");

        sqlx::query(
            r#"
            INSERT INTO promotions (
                id, name, description, kind, value, min_subtotal_cents,
                starts_at, ends_at, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.name)
        .bind(&promotion.description)
        .bind(promotion.kind)
        .bind(promotion.value)
        .bind(promotion.min_subtotal_cents)
        .bind(promotion.starts_at)
        .bind(promotion.ends_at)
        .bind(promotion.is_active)
        .bind(promotion.created_at)
        .bind(promotion.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(promotion.clone())
    }

    /// Updates an existing promotion.
    pub async fn update(&self, promotion: &Promotion) -> DbResult<()> {
        debug!(id = %promotion.id, "Updating promotion");

        let result = sqlx::query(
            r#"
            UPDATE promotions SET
                name = ?2,
                description = ?3,
                kind = ?4,
                value = ?5,
                min_subtotal_cents = ?6,
                starts_at = ?7,
                ends_at = ?8,
                is_active = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.name)
        .bind(&promotion.description)
        .bind(promotion.kind)
        .bind(promotion.value)
        .bind(promotion.min_subtotal_cents)
        .bind(promotion.starts_at)
        .bind(promotion.ends_at)
        .bind(promotion.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", &promotion.id));
        }

        Ok(())
    }

    /// Switches a promotion off. Orders keep referencing it.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating promotion");

        let result =
            sqlx::query("UPDATE promotions SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
