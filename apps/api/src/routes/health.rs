//! Liveness / readiness probe.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use pizzeria_db::migrations::migration_status;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub migrations_total: usize,
    pub migrations_applied: usize,
    pub version: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// 200 when the database answers and every migration is applied, 503
/// otherwise.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;
    let (migrations_total, migrations_applied) =
        migration_status(state.db.pool()).await.unwrap_or((0, 0));

    let healthy = database && migrations_total == migrations_applied;
    let status = if healthy {
        StatusCode::OK
    } else {
        tracing::warn!(database, migrations_total, migrations_applied, "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" },
            database,
            migrations_total,
            migrations_applied,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
