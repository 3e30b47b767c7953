//! # Admin Routes
//!
//! Menu, customization, promotion and order management for staff screens.
//! Mounted under `/api/admin` behind [`crate::auth::require_admin_token`].
//!
//! ```text
//! GET/POST          /categories              PUT/DELETE /categories/{id}
//! GET/POST          /menu-items              PUT/DELETE /menu-items/{id}
//! POST              /menu-items/{id}/groups  DELETE     /menu-items/{id}/groups/{group_id}
//! GET/POST          /customization-groups    PUT/DELETE /customization-groups/{id}
//! POST              /customization-groups/{id}/options
//! PUT/DELETE        /customization-options/{id}
//! GET               /orders                  GET        /orders/{id}
//! PATCH             /orders/{id}/status
//! GET/POST          /promotions              PUT/DELETE /promotions/{id}
//! GET               /customers
//! ```
//!
//! ## Deletion Policy
//! - Categories are deleted outright, and only while no item points at them
//!   (409 otherwise)
//! - Items, groups and options are soft-deleted (`is_active = false`) so
//!   past orders keep their references
//! - Promotions are deactivated

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use pizzeria_core::pricing::validate_group_config;
use pizzeria_core::validation::{
    validate_name, validate_optional_text, validate_percent_bps, validate_price_cents,
    validate_price_modifier_cents, MAX_NAME_LEN, MAX_NOTE_LEN,
};
use pizzeria_core::{
    Category, Customer, CustomizationGroup, CustomizationOption, GroupWithOptions, ItemKind,
    MenuItem, Order, OrderStatus, Promotion, PromotionKind, SelectionType,
};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::kitchen::{change_status, StatusUpdate};
use crate::routes::{OrderDetail, Pagination};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", put(update_category).delete(delete_category))
        .route("/menu-items", get(list_menu_items).post(create_menu_item))
        .route("/menu-items/:id", put(update_menu_item).delete(delete_menu_item))
        .route("/menu-items/:id/groups", post(attach_group))
        .route("/menu-items/:id/groups/:group_id", axum::routing::delete(detach_group))
        .route("/customization-groups", get(list_groups).post(create_group))
        .route("/customization-groups/:id", put(update_group).delete(delete_group))
        .route("/customization-groups/:id/options", post(create_option))
        .route("/customization-options/:id", put(update_option).delete(delete_option))
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_order_status))
        .route("/promotions", get(list_promotions).post(create_promotion))
        .route("/promotions/:id", put(update_promotion).delete(delete_promotion))
        .route("/customers", get(list_customers))
}

fn default_true() -> bool {
    true
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CategoryInput {
    fn apply(self, category: &mut Category) -> ApiResult<()> {
        category.name = validate_name("name", &self.name, MAX_NAME_LEN)?;
        category.description =
            validate_optional_text("description", self.description.as_deref(), MAX_NOTE_LEN)?;
        category.sort_order = self.sort_order;
        category.is_active = self.is_active;
        Ok(())
    }
}

async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.menu().list_categories(true).await?))
}

async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let now = Utc::now();
    let mut category = Category {
        id: new_id(),
        name: String::new(),
        description: None,
        sort_order: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    input.apply(&mut category)?;

    let category = state.db.menu().insert_category(&category).await?;
    info!(id = %category.id, name = %category.name, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<Json<Category>> {
    let menu = state.db.menu();
    let mut category = menu
        .get_category(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", &id))?;
    input.apply(&mut category)?;
    category.updated_at = Utc::now();

    menu.update_category(&category).await?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    state.db.menu().delete_category(&id).await?;
    info!(id = %id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Menu Items
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemInput {
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: ItemKind,
    pub base_price_cents: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_specialty: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i64,
}

impl MenuItemInput {
    fn apply(self, item: &mut MenuItem) -> ApiResult<()> {
        validate_price_cents(self.base_price_cents)?;
        item.category_id = self.category_id;
        item.name = validate_name("name", &self.name, MAX_NAME_LEN)?;
        item.description =
            validate_optional_text("description", self.description.as_deref(), MAX_NOTE_LEN)?;
        item.kind = self.kind;
        item.base_price_cents = self.base_price_cents;
        item.image_url = validate_optional_text("imageUrl", self.image_url.as_deref(), MAX_NOTE_LEN)?;
        item.is_specialty = self.is_specialty;
        item.is_active = self.is_active;
        item.sort_order = self.sort_order;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemFilter {
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default = "default_true")]
    pub include_inactive: bool,
}

async fn list_menu_items(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<MenuItemFilter>,
) -> ApiResult<Json<Vec<MenuItem>>> {
    let items = state
        .db
        .menu()
        .list_items(filter.category_id.as_deref(), filter.include_inactive)
        .await?;
    Ok(Json(items))
}

async fn ensure_category(state: &AppState, category_id: &str) -> ApiResult<()> {
    match state.db.menu().get_category(category_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::validation(format!(
            "categoryId does not exist: {}",
            category_id
        ))),
    }
}

async fn create_menu_item(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<MenuItemInput>,
) -> ApiResult<(StatusCode, Json<MenuItem>)> {
    ensure_category(&state, &input.category_id).await?;

    let now = Utc::now();
    let mut item = MenuItem {
        id: new_id(),
        category_id: String::new(),
        name: String::new(),
        description: None,
        kind: input.kind,
        base_price_cents: 0,
        image_url: None,
        is_specialty: false,
        is_active: true,
        sort_order: 0,
        created_at: now,
        updated_at: now,
    };
    input.apply(&mut item)?;

    let item = state.db.menu().insert_item(&item).await?;
    info!(id = %item.id, name = %item.name, "Menu item created");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_menu_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<MenuItemInput>,
) -> ApiResult<Json<MenuItem>> {
    let menu = state.db.menu();
    let mut item = menu
        .get_item(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Menu item", &id))?;
    ensure_category(&state, &input.category_id).await?;
    input.apply(&mut item)?;
    item.updated_at = Utc::now();

    menu.update_item(&item).await?;
    Ok(Json(item))
}

async fn delete_menu_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    state.db.menu().soft_delete_item(&id).await?;
    info!(id = %id, "Menu item deactivated");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachGroupInput {
    pub group_id: String,
    #[serde(default)]
    pub sort_order: i64,
}

/// Attaches a group to an item and returns the item's groups afterwards.
async fn attach_group(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<AttachGroupInput>,
) -> ApiResult<Json<Vec<GroupWithOptions>>> {
    if state.db.menu().get_item(&id).await?.is_none() {
        return Err(ApiError::not_found("Menu item", &id));
    }
    let customizations = state.db.customizations();
    if customizations.get_group(&input.group_id).await?.is_none() {
        return Err(ApiError::not_found("Customization group", &input.group_id));
    }

    customizations
        .attach_group(&id, &input.group_id, input.sort_order)
        .await?;
    Ok(Json(customizations.groups_for_item(&id).await?))
}

async fn detach_group(
    State(state): State<AppState>,
    ApiPath((id, group_id)): ApiPath<(String, String)>,
) -> ApiResult<StatusCode> {
    state.db.customizations().detach_group(&id, &group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Customization Groups & Options
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub selection_type: SelectionType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub min_selections: i64,
    #[serde(default)]
    pub max_selections: Option<i64>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl GroupInput {
    fn apply(self, group: &mut CustomizationGroup) -> ApiResult<()> {
        group.name = validate_name("name", &self.name, MAX_NAME_LEN)?;
        group.description =
            validate_optional_text("description", self.description.as_deref(), MAX_NOTE_LEN)?;
        group.selection_type = self.selection_type;
        group.is_required = self.is_required;
        group.min_selections = self.min_selections;
        group.max_selections = self.max_selections;
        group.sort_order = self.sort_order;
        group.is_active = self.is_active;
        validate_group_config(group)?;
        Ok(())
    }
}

async fn list_groups(State(state): State<AppState>) -> ApiResult<Json<Vec<GroupWithOptions>>> {
    let repo = state.db.customizations();
    let groups = repo.list_groups(true).await?;

    let mut result = Vec::with_capacity(groups.len());
    for group in groups {
        let options = repo.list_options(&group.id, true).await?;
        result.push(GroupWithOptions { group, options });
    }
    Ok(Json(result))
}

async fn create_group(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<GroupInput>,
) -> ApiResult<(StatusCode, Json<CustomizationGroup>)> {
    let now = Utc::now();
    let mut group = CustomizationGroup {
        id: new_id(),
        name: String::new(),
        description: None,
        selection_type: input.selection_type,
        is_required: false,
        min_selections: 0,
        max_selections: None,
        sort_order: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    input.apply(&mut group)?;

    let group = state.db.customizations().insert_group(&group).await?;
    info!(id = %group.id, name = %group.name, "Customization group created");
    Ok((StatusCode::CREATED, Json(group)))
}

async fn update_group(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<GroupInput>,
) -> ApiResult<Json<CustomizationGroup>> {
    let repo = state.db.customizations();
    let mut group = repo
        .get_group(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customization group", &id))?;
    input.apply(&mut group)?;
    group.updated_at = Utc::now();

    repo.update_group(&group).await?;
    Ok(Json(group))
}

async fn delete_group(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    state.db.customizations().soft_delete_group(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionInput {
    pub name: String,
    /// May be negative ("no cheese"); item prices never drop below zero.
    #[serde(default)]
    pub price_modifier_cents: i64,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl OptionInput {
    fn apply(self, option: &mut CustomizationOption) -> ApiResult<()> {
        option.name = validate_name("name", &self.name, MAX_NAME_LEN)?;
        validate_price_modifier_cents(self.price_modifier_cents)?;
        option.price_modifier_cents = self.price_modifier_cents;
        option.is_default = self.is_default;
        option.sort_order = self.sort_order;
        option.is_active = self.is_active;
        Ok(())
    }
}

async fn create_option(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<String>,
    ApiJson(input): ApiJson<OptionInput>,
) -> ApiResult<(StatusCode, Json<CustomizationOption>)> {
    let repo = state.db.customizations();
    if repo.get_group(&group_id).await?.is_none() {
        return Err(ApiError::not_found("Customization group", &group_id));
    }

    let now = Utc::now();
    let mut option = CustomizationOption {
        id: new_id(),
        group_id,
        name: String::new(),
        price_modifier_cents: 0,
        is_default: false,
        is_active: true,
        sort_order: 0,
        created_at: now,
        updated_at: now,
    };
    input.apply(&mut option)?;

    let option = repo.insert_option(&option).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

async fn update_option(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<OptionInput>,
) -> ApiResult<Json<CustomizationOption>> {
    let repo = state.db.customizations();
    let mut option = repo
        .get_option(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customization option", &id))?;
    input.apply(&mut option)?;
    option.updated_at = Utc::now();

    repo.update_option(&option).await?;
    Ok(Json(option))
}

async fn delete_option(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    state.db.customizations().soft_delete_option(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orders
// =============================================================================

/// `?status=&limit=&offset=`
#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

async fn list_orders(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<OrderFilter>,
) -> ApiResult<Json<Vec<Order>>> {
    let status = match filter.status.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(raw.parse::<OrderStatus>()?),
        None => None,
    };
    let page = Pagination {
        limit: filter.limit,
        offset: filter.offset,
    };

    let orders = state
        .db
        .orders()
        .list(status, page.limit(), page.offset())
        .await?;
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<OrderDetail>> {
    let order = state
        .db
        .orders()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &id))?;
    OrderDetail::load(&state.db, order).await.map(Json)
}

async fn update_order_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<Json<Order>> {
    change_status(&state, &id, update.status).await.map(Json)
}

// =============================================================================
// Promotions
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: PromotionKind,
    /// Basis points for percentage kinds, cents for a fixed amount.
    pub value: i64,
    #[serde(default)]
    pub min_subtotal_cents: i64,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl PromotionInput {
    fn apply(self, promotion: &mut Promotion) -> ApiResult<()> {
        match self.kind {
            PromotionKind::PizzaPairHalfOff | PromotionKind::PercentOff => {
                validate_percent_bps("value", self.value)?
            }
            PromotionKind::FixedAmountOff => {
                if self.value <= 0 {
                    return Err(ApiError::validation("value must be positive"));
                }
                validate_price_cents(self.value)?;
            }
        }
        validate_price_cents(self.min_subtotal_cents)?;
        if let (Some(starts_at), Some(ends_at)) = (self.starts_at, self.ends_at) {
            if ends_at <= starts_at {
                return Err(ApiError::validation("endsAt must be after startsAt"));
            }
        }

        promotion.name = validate_name("name", &self.name, MAX_NAME_LEN)?;
        promotion.description =
            validate_optional_text("description", self.description.as_deref(), MAX_NOTE_LEN)?;
        promotion.kind = self.kind;
        promotion.value = self.value;
        promotion.min_subtotal_cents = self.min_subtotal_cents;
        promotion.starts_at = self.starts_at;
        promotion.ends_at = self.ends_at;
        promotion.is_active = self.is_active;
        Ok(())
    }
}

async fn list_promotions(State(state): State<AppState>) -> ApiResult<Json<Vec<Promotion>>> {
    Ok(Json(state.db.promotions().list(true).await?))
}

async fn create_promotion(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<PromotionInput>,
) -> ApiResult<(StatusCode, Json<Promotion>)> {
    let now = Utc::now();
    let mut promotion = Promotion {
        id: new_id(),
        name: String::new(),
        description: None,
        kind: input.kind,
        value: 0,
        min_subtotal_cents: 0,
        starts_at: None,
        ends_at: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    input.apply(&mut promotion)?;

    let promotion = state.db.promotions().insert(&promotion).await?;
    info!(id = %promotion.id, name = %promotion.name, "Promotion created");
    Ok((StatusCode::CREATED, Json(promotion)))
}

async fn update_promotion(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<PromotionInput>,
) -> ApiResult<Json<Promotion>> {
    let repo = state.db.promotions();
    let mut promotion = repo
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Promotion", &id))?;
    input.apply(&mut promotion)?;
    promotion.updated_at = Utc::now();

    repo.update(&promotion).await?;
    Ok(Json(promotion))
}

async fn delete_promotion(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    state.db.promotions().deactivate(&id).await?;
    info!(id = %id, "Promotion deactivated");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Customers
// =============================================================================

async fn list_customers(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<Customer>>> {
    let customers = state
        .db
        .customers()
        .list(page.limit(), page.offset())
        .await?;
    Ok(Json(customers))
}
