//! # Fixed-Window Rate Limiter
//!
//! Counts requests per key (the customer's phone number at checkout) in
//! fixed windows. State is in-process; a restart forgets all counters.
//!
//! ```text
//!   window 1 (60s)            window 2 (60s)
//!   ├── 1 2 3 4 5 ✗ ✗ ──────┼── 1 2 ...
//!   start                    start + window → counter resets
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u32,
    window_start: Instant,
}

/// Outcome of a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    pub retry_after: Duration,
}

/// Per-key fixed-window limiter.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        RateLimiter {
            limit,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Records one request for `key`.
    ///
    /// Rejected requests are not counted.
    pub async fn check(&self, key: &str) -> Result<(), RateLimited> {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Result<(), RateLimited> {
        let mut entries = self.entries.lock().await;

        // Drop expired windows so the map does not grow without bound.
        let window = self.window;
        entries.retain(|_, e| now.duration_since(e.window_start) < window);

        let entry = entries.entry(key.to_string()).or_insert(Entry {
            count: 0,
            window_start: now,
        });

        if entry.count >= self.limit {
            let retry_after = window.saturating_sub(now.duration_since(entry.window_start));
            warn!(key = %key, limit = self.limit, "Rate limit exceeded");
            return Err(RateLimited { retry_after });
        }

        entry.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        for _ in 0..3 {
            assert!(limiter.check("5551234567").await.is_ok());
        }
        let rejected = limiter.check("5551234567").await.unwrap_err();
        assert!(rejected.retry_after <= Duration::from_secs(60));
        assert!(rejected.retry_after > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.check("a").await.is_ok());
        assert!(limiter.check("a").await.is_err());
        assert!(limiter.check("b").await.is_ok());
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.check_at("a", start).await.is_ok());
        assert!(limiter
            .check_at("a", start + Duration::from_secs(30))
            .await
            .is_err());
        assert!(limiter
            .check_at("a", start + Duration::from_secs(60))
            .await
            .is_ok());
    }
}
