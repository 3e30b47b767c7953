//! # Customization Repository
//!
//! Customization groups, their options, and which menu items offer them.
//!
//! ```text
//! menu_items ──< menu_item_customization_groups >── customization_groups
//!                       (sort_order)                        │
//!                                                           └──< customization_options
//! ```
//!
//! One group ("Pizza Toppings") is shared by every pizza; editing it once
//! changes every item it is attached to.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pizzeria_core::{CustomizationGroup, CustomizationOption, GroupWithOptions};

const GROUP_COLUMNS: &str = "id, name, description, selection_type, is_required, \
     min_selections, max_selections, sort_order, is_active, created_at, updated_at";

const OPTION_COLUMNS: &str = "id, group_id, name, price_modifier_cents, is_default, \
     is_active, sort_order, created_at, updated_at";

/// Repository for customization groups and options.
#[derive(Debug, Clone)]
pub struct CustomizationRepository {
    pool: SqlitePool,
}

impl CustomizationRepository {
    /// Creates a new CustomizationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomizationRepository { pool }
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Lists groups in display order.
    pub async fn list_groups(&self, include_inactive: bool) -> DbResult<Vec<CustomizationGroup>> {
        let sql = format!(
            "SELECT {GROUP_COLUMNS} FROM customization_groups
             WHERE (?1 OR is_active = 1)
             ORDER BY sort_order, name"
        );

        let groups = sqlx::query_as::<_, CustomizationGroup>(&sql)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;

        Ok(groups)
    }

    /// Gets a group by its ID.
    pub async fn get_group(&self, id: &str) -> DbResult<Option<CustomizationGroup>> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM customization_groups WHERE id = ?1");

        let group = sqlx::query_as::<_, CustomizationGroup>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(group)
    }

    /// Inserts a new group.
    ///
    /// Limits should already have passed `pricing::validate_group_config`.
    pub async fn insert_group(&self, group: &CustomizationGroup) -> DbResult<CustomizationGroup> {
        debug!(name = %group.name, "Inserting customization group");

        sqlx::query(
            r#"
            INSERT INTO customization_groups (
                id, name, description, selection_type, is_required,
                min_selections, max_selections, sort_order, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&group.id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.selection_type)
        .bind(group.is_required)
        .bind(group.min_selections)
        .bind(group.max_selections)
        .bind(group.sort_order)
        .bind(group.is_active)
        .bind(group.created_at)
        .bind(group.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(group.clone())
    }

    /// Updates an existing group.
    pub async fn update_group(&self, group: &CustomizationGroup) -> DbResult<()> {
        debug!(id = %group.id, "Updating customization group");

        let result = sqlx::query(
            r#"
            UPDATE customization_groups SET
                name = ?2,
                description = ?3,
                selection_type = ?4,
                is_required = ?5,
                min_selections = ?6,
                max_selections = ?7,
                sort_order = ?8,
                is_active = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&group.id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.selection_type)
        .bind(group.is_required)
        .bind(group.min_selections)
        .bind(group.max_selections)
        .bind(group.sort_order)
        .bind(group.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomizationGroup", &group.id));
        }

        Ok(())
    }

    /// Soft-deletes a group. Its options stay (orders reference them) but
    /// are no longer offered anywhere.
    pub async fn soft_delete_group(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting customization group");

        let result = sqlx::query(
            "UPDATE customization_groups SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomizationGroup", id));
        }

        Ok(())
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Lists the options of one group in display order.
    pub async fn list_options(
        &self,
        group_id: &str,
        include_inactive: bool,
    ) -> DbResult<Vec<CustomizationOption>> {
        let sql = format!(
            "SELECT {OPTION_COLUMNS} FROM customization_options
             WHERE group_id = ?1 AND (?2 OR is_active = 1)
             ORDER BY sort_order, name"
        );

        let options = sqlx::query_as::<_, CustomizationOption>(&sql)
            .bind(group_id)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;

        Ok(options)
    }

    /// Gets an option by its ID.
    pub async fn get_option(&self, id: &str) -> DbResult<Option<CustomizationOption>> {
        let sql = format!("SELECT {OPTION_COLUMNS} FROM customization_options WHERE id = ?1");

        let option = sqlx::query_as::<_, CustomizationOption>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(option)
    }

    /// Inserts a new option.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - unknown group
    pub async fn insert_option(
        &self,
        option: &CustomizationOption,
    ) -> DbResult<CustomizationOption> {
        debug!(name = %option.name, group_id = %option.group_id, "Inserting option");

        sqlx::query(
            r#"
            INSERT INTO customization_options (
                id, group_id, name, price_modifier_cents, is_default,
                is_active, sort_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&option.id)
        .bind(&option.group_id)
        .bind(&option.name)
        .bind(option.price_modifier_cents)
        .bind(option.is_default)
        .bind(option.is_active)
        .bind(option.sort_order)
        .bind(option.created_at)
        .bind(option.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(option.clone())
    }

    /// Updates an existing option. The group cannot change.
    pub async fn update_option(&self, option: &CustomizationOption) -> DbResult<()> {
        debug!(id = %option.id, "Updating option");

        let result = sqlx::query(
            r#"
            UPDATE customization_options SET
                name = ?2,
                price_modifier_cents = ?3,
                is_default = ?4,
                is_active = ?5,
                sort_order = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&option.id)
        .bind(&option.name)
        .bind(option.price_modifier_cents)
        .bind(option.is_default)
        .bind(option.is_active)
        .bind(option.sort_order)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomizationOption", &option.id));
        }

        Ok(())
    }

    /// Soft-deletes an option.
    pub async fn soft_delete_option(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting option");

        let result = sqlx::query(
            "UPDATE customization_options SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomizationOption", id));
        }

        Ok(())
    }

    // =========================================================================
    // Item Links
    // =========================================================================

    /// Offers `group_id` on `menu_item_id`, or moves it to `sort_order` if
    /// already attached.
    pub async fn attach_group(
        &self,
        menu_item_id: &str,
        group_id: &str,
        sort_order: i64,
    ) -> DbResult<()> {
        debug!(menu_item_id = %menu_item_id, group_id = %group_id, "Attaching group");

        sqlx::query(
            r#"
            INSERT INTO menu_item_customization_groups (menu_item_id, group_id, sort_order)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (menu_item_id, group_id) DO UPDATE SET sort_order = excluded.sort_order
            "#,
        )
        .bind(menu_item_id)
        .bind(group_id)
        .bind(sort_order)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Stops offering `group_id` on `menu_item_id`.
    pub async fn detach_group(&self, menu_item_id: &str, group_id: &str) -> DbResult<()> {
        debug!(menu_item_id = %menu_item_id, group_id = %group_id, "Detaching group");

        let result = sqlx::query(
            "DELETE FROM menu_item_customization_groups WHERE menu_item_id = ?1 AND group_id = ?2",
        )
        .bind(menu_item_id)
        .bind(group_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "MenuItemCustomizationGroup",
                format!("{menu_item_id}/{group_id}"),
            ));
        }

        Ok(())
    }

    /// Loads the active groups of an item with their active options, in the
    /// item's display order. This is exactly what pricing needs.
    pub async fn groups_for_item(&self, menu_item_id: &str) -> DbResult<Vec<GroupWithOptions>> {
        let groups = sqlx::query_as::<_, CustomizationGroup>(
            r#"
            SELECT g.id, g.name, g.description, g.selection_type, g.is_required,
                   g.min_selections, g.max_selections, g.sort_order, g.is_active,
                   g.created_at, g.updated_at
            FROM customization_groups g
            INNER JOIN menu_item_customization_groups link ON link.group_id = g.id
            WHERE link.menu_item_id = ?1 AND g.is_active = 1
            ORDER BY link.sort_order, g.sort_order, g.name
            "#,
        )
        .bind(menu_item_id)
        .fetch_all(&self.pool)
        .await?;

        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let options = sqlx::query_as::<_, CustomizationOption>(
            r#"
            SELECT o.id, o.group_id, o.name, o.price_modifier_cents, o.is_default,
                   o.is_active, o.sort_order, o.created_at, o.updated_at
            FROM customization_options o
            INNER JOIN menu_item_customization_groups link ON link.group_id = o.group_id
            WHERE link.menu_item_id = ?1 AND o.is_active = 1
            ORDER BY o.sort_order, o.name
            "#,
        )
        .bind(menu_item_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_group: HashMap<String, Vec<CustomizationOption>> = HashMap::new();
        for option in options {
            by_group.entry(option.group_id.clone()).or_default().push(option);
        }

        let result: Vec<GroupWithOptions> = groups
            .into_iter()
            .map(|group| {
                let options = by_group.remove(&group.id).unwrap_or_default();
                GroupWithOptions { group, options }
            })
            .collect();

        debug!(menu_item_id = %menu_item_id, groups = result.len(), "Loaded item groups");
        Ok(result)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
