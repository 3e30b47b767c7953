//! Shared application state handed to every handler.

use std::sync::Arc;
use std::time::Duration;

use pizzeria_db::Database;

use crate::config::ApiConfig;
use crate::rate_limit::RateLimiter;

/// Cloned into each request by axum; everything inside is cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
    pub checkout_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let checkout_limiter = RateLimiter::new(
            config.checkout_rate_limit,
            Duration::from_secs(config.checkout_rate_window_secs),
        );

        AppState {
            db,
            config: Arc::new(config),
            checkout_limiter: Arc::new(checkout_limiter),
        }
    }
}
