//! # Kitchen Display Routes
//!
//! The kitchen screen polls the queue; there is no push channel.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Kitchen screen                          API                            │
//! │                                                                         │
//! │  every pollIntervalSecs ───────────► GET /api/kitchen/orders            │
//! │                         ◄─────────── tickets, oldest first              │
//! │                                                                         │
//! │  tap "Start" ──────────────────────► PATCH .../{id}/status              │
//! │                                      { "status": "preparing" }          │
//! │                         ◄─────────── 200 order | 422 illegal move       │
//! │                                      | 409 another screen moved it      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::State;
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use pizzeria_core::kitchen::{transition, KitchenTicket};
use pizzeria_core::{Order, OrderStatus};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenQueueResponse {
    pub orders: Vec<KitchenTicket>,
    pub poll_interval_secs: u64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(kitchen_queue))
        .route("/orders/:id/status", patch(update_status))
}

async fn kitchen_queue(State(state): State<AppState>) -> ApiResult<Json<KitchenQueueResponse>> {
    let now = Utc::now();
    let repo = state.db.orders();
    let orders = repo.kitchen_orders().await?;

    let mut tickets = Vec::with_capacity(orders.len());
    for order in &orders {
        let items = repo.get_items(&order.id).await?;
        let customizations = repo.get_item_customizations(&order.id).await?;
        tickets.push(KitchenTicket::new(
            order,
            &items,
            &customizations,
            now,
            state.config.kitchen_late_minutes,
        ));
    }

    Ok(Json(KitchenQueueResponse {
        orders: tickets,
        poll_interval_secs: state.config.kitchen_poll_secs,
        generated_at: now,
    }))
}

async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<Json<Order>> {
    change_status(&state, &id, update.status).await.map(Json)
}

/// Applies one status move, shared with the admin order screen.
pub(crate) async fn change_status(
    state: &AppState,
    order_id: &str,
    next: OrderStatus,
) -> ApiResult<Order> {
    let repo = state.db.orders();
    let mut order = repo
        .get(order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", order_id))?;

    let previous = order.status;
    transition(&mut order, next, Utc::now())?;
    repo.update_status(&order, previous).await?;

    info!(
        order_number = %order.order_number,
        from = %previous,
        to = %order.status,
        "Order status changed"
    );
    Ok(order)
}
