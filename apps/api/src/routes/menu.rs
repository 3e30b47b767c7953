//! # Menu Routes
//!
//! Read-only storefront views of the menu.
//!
//! ```text
//! GET /api/menu                       categories with their items
//! GET /api/menu/search?q=pep          name / description search
//! GET /api/menu/items/{id}            one item + its customization groups
//! GET /api/specialty-pizzas[/{id}]    pre-built pizzas
//! GET /api/specialty-calzones[/{id}]  pre-built calzones
//! ```
//!
//! Inactive categories and items are invisible here; an inactive item
//! answers 404 exactly like a missing one.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use pizzeria_core::validation::validate_search_query;
use pizzeria_core::{Category, GroupWithOptions, ItemKind, MenuItem};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiPath, ApiQuery};
use crate::state::AppState;

const SEARCH_LIMIT: u32 = 25;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    #[serde(flatten)]
    pub category: Category,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuResponse {
    pub categories: Vec<MenuCategory>,
}

/// A menu item with everything the builder needs to render it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemDetail {
    pub item: MenuItem,
    pub groups: Vec<GroupWithOptions>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/menu", get(get_menu))
        .route("/menu/search", get(search_menu))
        .route("/menu/items/:id", get(get_menu_item))
        .route("/specialty-pizzas", get(list_specialty_pizzas))
        .route("/specialty-pizzas/:id", get(get_specialty_pizza))
        .route("/specialty-calzones", get(list_specialty_calzones))
        .route("/specialty-calzones/:id", get(get_specialty_calzone))
}

/// Active categories in display order, each with its active items.
/// Categories with nothing to sell are left out.
async fn get_menu(State(state): State<AppState>) -> ApiResult<Json<MenuResponse>> {
    let menu = state.db.menu();
    let categories = menu.list_categories(false).await?;
    let mut items = menu.list_items(None, false).await?;

    let categories: Vec<MenuCategory> = categories
        .into_iter()
        .map(|category| {
            let (mine, rest): (Vec<_>, Vec<_>) = items
                .drain(..)
                .partition(|item| item.category_id == category.id);
            items = rest;
            MenuCategory {
                category,
                items: mine,
            }
        })
        .filter(|c| !c.items.is_empty())
        .collect();

    debug!(categories = categories.len(), "Served menu");
    Ok(Json(MenuResponse { categories }))
}

async fn search_menu(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<Json<Vec<MenuItem>>> {
    let query = validate_search_query(&params.q)?;
    let items = state.db.menu().search(&query, SEARCH_LIMIT).await?;
    Ok(Json(items))
}

async fn get_menu_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<MenuItemDetail>> {
    let item = active_item(&state, &id).await?;
    item_detail(&state, item).await.map(Json)
}

async fn list_specialty_pizzas(State(state): State<AppState>) -> ApiResult<Json<Vec<MenuItem>>> {
    Ok(Json(state.db.menu().list_specialties(ItemKind::Pizza).await?))
}

async fn get_specialty_pizza(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<MenuItemDetail>> {
    specialty(&state, &id, ItemKind::Pizza).await.map(Json)
}

async fn list_specialty_calzones(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MenuItem>>> {
    Ok(Json(state.db.menu().list_specialties(ItemKind::Calzone).await?))
}

async fn get_specialty_calzone(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<MenuItemDetail>> {
    specialty(&state, &id, ItemKind::Calzone).await.map(Json)
}

// =============================================================================
// Helpers
// =============================================================================

async fn active_item(state: &AppState, id: &str) -> ApiResult<MenuItem> {
    state
        .db
        .menu()
        .get_item(id)
        .await?
        .filter(|item| item.is_active)
        .ok_or_else(|| ApiError::not_found("Menu item", id))
}

async fn item_detail(state: &AppState, item: MenuItem) -> ApiResult<MenuItemDetail> {
    let groups = state.db.customizations().groups_for_item(&item.id).await?;
    Ok(MenuItemDetail { item, groups })
}

async fn specialty(state: &AppState, id: &str, kind: ItemKind) -> ApiResult<MenuItemDetail> {
    let item = active_item(state, id).await?;
    if item.kind != kind || !item.is_specialty {
        let resource = match kind {
            ItemKind::Calzone => "Specialty calzone",
            _ => "Specialty pizza",
        };
        return Err(ApiError::not_found(resource, id));
    }
    item_detail(state, item).await
}
