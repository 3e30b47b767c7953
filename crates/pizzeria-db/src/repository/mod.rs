//! # Repository Module
//!
//! Database repository implementations for the pizzeria backend.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.menu().list_items(Some(category), false)                   │
//! │       ▼                                                                 │
//! │  MenuRepository                                                        │
//! │  ├── list_items(&self, category, include_inactive)                     │
//! │  ├── get_item(&self, id)                                               │
//! │  ├── insert_item(&self, item)                                          │
//! │  └── update_item(&self, item)                                          │
//! │       │                                                                 │
//! │       │  SQL Query (runtime-checked, mapped with FromRow)              │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every repository holds a clone of the pool; creating one is free.
//!
//! ## Available Repositories
//!
//! - [`menu::MenuRepository`] - Categories and menu items
//! - [`customization::CustomizationRepository`] - Groups, options, item links
//! - [`order::OrderRepository`] - Checkout transaction, order queries, status
//! - [`promotion::PromotionRepository`] - Promotion CRUD and live lookup
//! - [`customer::CustomerRepository`] - Customers keyed by phone

pub mod customer;
pub mod customization;
pub mod menu;
pub mod order;
pub mod promotion;

/// Shared fixtures for repository tests.
#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use pizzeria_core::{Category, ItemKind, MenuItem};
    use uuid::Uuid;

    use crate::pool::{Database, DbConfig};

    pub(crate) async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub(crate) fn category(name: &str, sort_order: i64) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            sort_order,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn menu_item(category_id: &str, name: &str, kind: ItemKind, cents: i64) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: Uuid::new_v4().to_string(),
            category_id: category_id.to_string(),
            name: name.to_string(),
            description: None,
            kind,
            base_price_cents: cents,
            image_url: None,
            is_specialty: false,
            is_active: true,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// A database with one "Pizza" category and one cheese pizza in it.
    pub(crate) async fn db_with_pizza() -> (Database, MenuItem) {
        let db = test_db().await;
        let cat = category("Pizza", 0);
        db.menu().insert_category(&cat).await.unwrap();
        let pizza = menu_item(&cat.id, "Cheese Pizza", ItemKind::Pizza, 1299);
        db.menu().insert_item(&pizza).await.unwrap();
        (db, pizza)
    }
}
