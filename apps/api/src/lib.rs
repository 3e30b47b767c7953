//! # Pizzeria API
//!
//! JSON HTTP server for the storefront, the admin screens and the kitchen
//! display.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           /api Router                                   │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐ │
//! │  │  Storefront    │  │  Admin         │  │  Kitchen                   │ │
//! │  │                │  │  (token guard) │  │  (token guard)             │ │
//! │  │ • menu         │  │ • categories   │  │ • GET  /kitchen/orders     │ │
//! │  │ • specialties  │  │ • menu-items   │  │ • PATCH .../status         │ │
//! │  │ • cart/quote   │  │ • customization│  │                            │ │
//! │  │ • checkout     │  │ • orders       │  │  screens poll every        │ │
//! │  │ • orders/{no}  │  │ • promotions   │  │  pollIntervalSecs          │ │
//! │  │ • health       │  │ • customers    │  │                            │ │
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘ │
//! │                                                                         │
//! │  Layers: TraceLayer (request spans) → CorsLayer                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig`]):
//! - `PORT`, `DATABASE_PATH`
//! - `TAX_RATE_BPS`, `DELIVERY_FEE_CENTS`
//! - `KITCHEN_POLL_SECS`, `KITCHEN_LATE_MINUTES`
//! - `CHECKOUT_RATE_LIMIT`, `CHECKOUT_RATE_WINDOW_SECS`
//! - `CORS_ORIGIN`, `ADMIN_TOKEN`

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod rate_limit;
pub mod routes;
pub mod state;

use axum::http::HeaderValue;
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::state::AppState;

/// Builds the complete application router.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/admin", routes::admin::router())
        .nest("/kitchen", routes::kitchen::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin_token,
        ));

    let api = Router::new()
        .merge(routes::health::router())
        .merge(routes::menu::router())
        .merge(routes::cart::router())
        .merge(routes::checkout::router())
        .merge(protected);

    Router::new()
        .nest("/api", api)
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match config
        .cors_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        Some(origin) => layer.allow_origin(origin),
        None => layer.allow_origin(Any),
    }
}

// =============================================================================
// Router Tests
// =============================================================================
