//! # Menu Repository
//!
//! Database operations for categories and menu items.
//!
//! ## Soft Deletes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  order_items.menu_item_id ──► menu_items.id                             │
//! │                                                                         │
//! │  Orders keep pointing at the item forever, so "deleting" an item only  │
//! │  flips is_active = 0. The storefront never shows inactive items; the   │
//! │  admin screens can list them with include_inactive = true.             │
//! │                                                                         │
//! │  Categories are hard-deleted, and only when empty (FK → 409).          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pizzeria_core::{Category, ItemKind, MenuItem};

const CATEGORY_COLUMNS: &str =
    "id, name, description, sort_order, is_active, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, category_id, name, description, kind, base_price_cents, \
     image_url, is_specialty, is_active, sort_order, created_at, updated_at";

/// Repository for categories and menu items.
///
/// ## Usage
/// ```rust,ignore
/// let repo = MenuRepository::new(pool);
///
/// let categories = repo.list_categories(false).await?;
/// let item = repo.get_item("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    /// Creates a new MenuRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Lists categories in display order.
    pub async fn list_categories(&self, include_inactive: bool) -> DbResult<Vec<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE (?1 OR is_active = 1)
             ORDER BY sort_order, name"
        );

        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    /// Gets a category by its ID.
    pub async fn get_category(&self, id: &str) -> DbResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1");

        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - name already taken
    pub async fn insert_category(&self, category: &Category) -> DbResult<Category> {
        debug!(name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (
                id, name, description, sort_order, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&category.name))?;

        Ok(category.clone())
    }

    /// Updates an existing category.
    pub async fn update_category(&self, category: &Category) -> DbResult<()> {
        debug!(id = %category.id, "Updating category");

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = ?2,
                description = ?3,
                sort_order = ?4,
                is_active = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&category.name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", &category.id));
        }

        Ok(())
    }

    /// Deletes a category.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - the category still has items
    pub async fn delete_category(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    // =========================================================================
    // Menu Items
    // =========================================================================

    /// Lists menu items, optionally for one category.
    ///
    /// ## Arguments
    /// * `category_id` - `None` lists every category
    /// * `include_inactive` - admin listing; the storefront passes `false`
    pub async fn list_items(
        &self,
        category_id: Option<&str>,
        include_inactive: bool,
    ) -> DbResult<Vec<MenuItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items
             WHERE (?1 IS NULL OR category_id = ?1)
               AND (?2 OR is_active = 1)
             ORDER BY sort_order, name"
        );

        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(category_id)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Listed menu items");
        Ok(items)
    }

    /// Lists the active specialty items of one kind (specialty pizzas,
    /// specialty calzones) from active categories.
    pub async fn list_specialties(&self, kind: ItemKind) -> DbResult<Vec<MenuItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items
             WHERE kind = ?1 AND is_specialty = 1 AND is_active = 1
               AND category_id IN (SELECT id FROM categories WHERE is_active = 1)
             ORDER BY sort_order, name"
        );

        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(kind)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Gets a menu item by its ID (active or not).
    ///
    /// ## Returns
    /// * `Ok(Some(MenuItem))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_item(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM menu_items WHERE id = ?1");

        let item = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Inserts a new menu item.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - unknown category
    pub async fn insert_item(&self, item: &MenuItem) -> DbResult<MenuItem> {
        debug!(name = %item.name, kind = item.kind.as_str(), "Inserting menu item");

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, category_id, name, description, kind, base_price_cents,
                image_url, is_specialty, is_active, sort_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&item.id)
        .bind(&item.category_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.kind)
        .bind(item.base_price_cents)
        .bind(&item.image_url)
        .bind(item.is_specialty)
        .bind(item.is_active)
        .bind(item.sort_order)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item.clone())
    }

    /// Updates an existing menu item.
    ///
    /// Past orders are unaffected: they carry their own snapshots.
    pub async fn update_item(&self, item: &MenuItem) -> DbResult<()> {
        debug!(id = %item.id, "Updating menu item");

        let result = sqlx::query(
            r#"
            UPDATE menu_items SET
                category_id = ?2,
                name = ?3,
                description = ?4,
                kind = ?5,
                base_price_cents = ?6,
                image_url = ?7,
                is_specialty = ?8,
                is_active = ?9,
                sort_order = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.category_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.kind)
        .bind(item.base_price_cents)
        .bind(&item.image_url)
        .bind(item.is_specialty)
        .bind(item.is_active)
        .bind(item.sort_order)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", &item.id));
        }

        Ok(())
    }

    /// Soft-deletes a menu item by setting is_active = false.
    pub async fn soft_delete_item(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting menu item");

        let result = sqlx::query("UPDATE menu_items SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id));
        }

        Ok(())
    }

    /// Searches active items by name or description. Items of an inactive
    /// category are skipped, matching what `GET /menu` shows.
    ///
    /// Plain `LIKE` matching: the menu is a few hundred rows at most.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<MenuItem>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching menu items");

        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items
             WHERE is_active = 1
               AND category_id IN (SELECT id FROM categories WHERE is_active = 1)
               AND (name LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\')
             ORDER BY name
             LIMIT ?2"
        );

        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Search returned items");
        Ok(items)
    }

    /// Counts active menu items (for diagnostics).
    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Escapes `%`, `_` and `\` so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{category, db_with_pizza, menu_item, test_db};

    #[tokio::test]
    async fn test_category_crud() {
        let db = test_db().await;
        let repo = db.menu();

        let subs = category("Subs", 2);
        let pizza = category("Pizza", 1);
        repo.insert_category(&subs).await.unwrap();
        repo.insert_category(&pizza).await.unwrap();

        let names: Vec<String> = repo
            .list_categories(false)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Pizza", "Subs"]);

        // Duplicate name
        let err = repo.insert_category(&category("Pizza", 5)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(err.to_string(), "categories.name 'Pizza' already exists");

        let mut renamed = subs.clone();
        renamed.name = "Pizza".to_string();
        let err = repo.update_category(&renamed).await.unwrap_err();
        assert_eq!(err.to_string(), "categories.name 'Pizza' already exists");

        let mut hidden = subs.clone();
        hidden.is_active = false;
        repo.update_category(&hidden).await.unwrap();
        assert_eq!(repo.list_categories(false).await.unwrap().len(), 1);
        assert_eq!(repo.list_categories(true).await.unwrap().len(), 2);

        repo.delete_category(&subs.id).await.unwrap();
        assert!(repo.get_category(&subs.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_category(&subs.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_category_with_items_cannot_be_deleted() {
        let (db, pizza) = db_with_pizza().await;
        let err = db.menu().delete_category(&pizza.category_id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_item_roundtrip_and_soft_delete() {
        let (db, pizza) = db_with_pizza().await;
        let repo = db.menu();

        let loaded = repo.get_item(&pizza.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Cheese Pizza");
        assert_eq!(loaded.kind, ItemKind::Pizza);
        assert_eq!(loaded.base_price_cents, 1299);

        let mut updated = loaded.clone();
        updated.base_price_cents = 1399;
        repo.update_item(&updated).await.unwrap();
        assert_eq!(
            repo.get_item(&pizza.id).await.unwrap().unwrap().base_price_cents,
            1399
        );

        repo.soft_delete_item(&pizza.id).await.unwrap();
        assert!(repo.list_items(None, false).await.unwrap().is_empty());
        assert_eq!(repo.list_items(None, true).await.unwrap().len(), 1);
        assert_eq!(repo.count_items().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_items_by_category_and_specialties() {
        let (db, pizza) = db_with_pizza().await;
        let repo = db.menu();

        let subs = category("Subs", 1);
        repo.insert_category(&subs).await.unwrap();
        repo.insert_item(&menu_item(&subs.id, "Italian Sub", ItemKind::Sub, 999))
            .await
            .unwrap();

        let mut supreme = menu_item(&pizza.category_id, "Supreme", ItemKind::Pizza, 1899);
        supreme.is_specialty = true;
        repo.insert_item(&supreme).await.unwrap();

        assert_eq!(repo.list_items(Some(&subs.id), false).await.unwrap().len(), 1);
        assert_eq!(repo.list_items(None, false).await.unwrap().len(), 3);

        let specialties = repo.list_specialties(ItemKind::Pizza).await.unwrap();
        assert_eq!(specialties.len(), 1);
        assert_eq!(specialties[0].name, "Supreme");
        assert!(repo.list_specialties(ItemKind::Calzone).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search() {
        let (db, _) = db_with_pizza().await;
        let repo = db.menu();

        assert_eq!(repo.search("cheese", 10).await.unwrap().len(), 1);
        assert_eq!(repo.search("CHEESE", 10).await.unwrap().len(), 1);
        assert!(repo.search("anchovy", 10).await.unwrap().is_empty());
        assert!(repo.search("%", 10).await.unwrap().is_empty());
        assert_eq!(repo.search("  ", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_skips_hidden_categories() {
        let (db, pizza) = db_with_pizza().await;
        let repo = db.menu();

        let mut supreme = menu_item(&pizza.category_id, "Supreme", ItemKind::Pizza, 1899);
        supreme.is_specialty = true;
        repo.insert_item(&supreme).await.unwrap();
        assert_eq!(repo.search("", 10).await.unwrap().len(), 2);

        let mut hidden = repo.get_category(&pizza.category_id).await.unwrap().unwrap();
        hidden.is_active = false;
        repo.update_category(&hidden).await.unwrap();

        assert!(repo.search("cheese", 10).await.unwrap().is_empty());
        assert!(repo.search("", 10).await.unwrap().is_empty());
        assert!(repo.list_specialties(ItemKind::Pizza).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let db = test_db().await;
        let err = db
            .menu()
            .insert_item(&menu_item("missing", "Ghost", ItemKind::Side, 100))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
