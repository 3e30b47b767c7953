//! # Cart Routes
//!
//! The storefront keeps the cart client-side. Before showing totals (and
//! again at checkout) it sends the lines here and gets them back priced from
//! the current menu. Client-supplied prices are never trusted.
//!
//! ## Repricing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  [{ menuItemId, quantity, options: [{ optionId, quantity }] }, ...]     │
//! │       │                                                                 │
//! │       ▼  per line                                                       │
//! │  1. Load menu item (404 missing, 422 inactive)                          │
//! │  2. Load its groups + options                                           │
//! │  3. price_item: base + Σ(modifier × quantity), group limits checked     │
//! │  4. Cart::add_line (identical lines merge)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartTotals::compute: best live promotion, tax, delivery fee            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use pizzeria_core::cart::{Cart, CartLine, CartTotals};
use pizzeria_core::pricing::{price_item, SelectedOption};
use pizzeria_core::validation::{validate_cart_size, validate_optional_text, MAX_NOTE_LEN};
use pizzeria_core::{CoreError, Money, OrderType};

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// One line as the storefront sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub menu_item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub options: Vec<SelectedOption>,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub items: Vec<CartLineRequest>,
    #[serde(default)]
    pub order_type: OrderType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/cart/quote", post(quote))
}

async fn quote(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QuoteRequest>,
) -> ApiResult<Json<QuoteResponse>> {
    let now = Utc::now();
    let (cart, totals) = price_cart(&state, &request.items, request.order_type, now).await?;

    Ok(Json(QuoteResponse {
        lines: cart.lines,
        totals,
    }))
}

/// Rebuilds a cart from the request lines and computes its totals.
pub(crate) async fn price_cart(
    state: &AppState,
    lines: &[CartLineRequest],
    order_type: OrderType,
    now: DateTime<Utc>,
) -> ApiResult<(Cart, CartTotals)> {
    validate_cart_size(lines.len())?;

    let mut cart = Cart::new();
    for line in lines {
        let item = state
            .db
            .menu()
            .get_item(&line.menu_item_id)
            .await?
            .ok_or_else(|| CoreError::MenuItemNotFound(line.menu_item_id.clone()))?;
        if !item.is_active {
            return Err(CoreError::MenuItemUnavailable(item.name).into());
        }

        let groups = state.db.customizations().groups_for_item(&item.id).await?;
        let priced = price_item(item.base_price(), &groups, &line.options)?;
        let instructions = validate_optional_text(
            "specialInstructions",
            line.special_instructions.as_deref(),
            MAX_NOTE_LEN,
        )?;

        cart.add_line(CartLine::new(&item, priced, line.quantity, instructions))?;
    }

    let promotions = state.db.promotions().list_live(now).await?;
    let delivery_fee = match order_type {
        OrderType::Delivery => state.config.delivery_fee(),
        OrderType::Pickup => Money::zero(),
    };
    let totals = CartTotals::compute(
        &cart,
        &promotions,
        state.config.tax_rate(),
        delivery_fee,
        now,
    );

    debug!(
        lines = cart.item_count(),
        subtotal = totals.subtotal_cents,
        discount = totals.discount_cents,
        total = totals.total_cents,
        "Priced cart"
    );

    Ok((cart, totals))
}
