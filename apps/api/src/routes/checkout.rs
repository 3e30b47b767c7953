//! # Checkout Routes
//!
//! ```text
//! POST /api/checkout                  place an order (201)
//! GET  /api/orders/{order_number}     customer order-status lookup
//! ```
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. validate_checkout      name / phone / email / address   → 400       │
//! │  2. rate limit per phone   CHECKOUT_RATE_LIMIT per window   → 429       │
//! │  3. price_cart             server-side repricing            → 400/404   │
//! │  4. build_order            rows + snapshots, status pending             │
//! │  5. orders().create        one transaction, order number assigned       │
//! │  6. 201 { order, items }                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use pizzeria_core::order::{build_order, validate_checkout, CheckoutRequest};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::routes::cart::{price_cart, CartLineRequest};
use crate::routes::OrderDetail;
use crate::state::AppState;

/// Checkout body: customer details plus the cart lines.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    #[serde(flatten)]
    pub details: CheckoutRequest,
    pub items: Vec<CartLineRequest>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/orders/:order_number", get(get_order_by_number))
}

async fn checkout(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CheckoutBody>,
) -> ApiResult<(StatusCode, Json<OrderDetail>)> {
    let details = validate_checkout(&body.details)?;

    if let Err(limited) = state.checkout_limiter.check(&details.customer_phone).await {
        return Err(ApiError::rate_limited(limited.retry_after.as_secs().max(1)));
    }

    let now = Utc::now();
    let (cart, totals) = price_cart(&state, &body.items, details.order_type, now).await?;
    let new_order = build_order(&cart, &totals, &details, now)?;

    let order = state.db.orders().create(new_order).await?;
    info!(
        order_number = %order.order_number,
        order_type = ?order.order_type,
        total_cents = order.total_cents,
        "Order placed"
    );

    let detail = OrderDetail::load(&state.db, order).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn get_order_by_number(
    State(state): State<AppState>,
    ApiPath(order_number): ApiPath<String>,
) -> ApiResult<Json<OrderDetail>> {
    let order = state
        .db
        .orders()
        .get_by_number(order_number.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &order_number))?;

    OrderDetail::load(&state.db, order).await.map(Json)
}
