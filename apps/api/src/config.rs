//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use pizzeria_core::validation::validate_tax_rate_bps;
use pizzeria_core::{Money, TaxRate};

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Store tax rate in basis points (825 = 8.25%)
    pub tax_rate_bps: u32,

    /// Flat fee added to delivery orders
    pub delivery_fee_cents: i64,

    /// How often kitchen screens should refresh
    pub kitchen_poll_secs: u64,

    /// Orders waiting at least this long are flagged late
    pub kitchen_late_minutes: i64,

    /// Checkouts allowed per phone number per window
    pub checkout_rate_limit: u32,

    /// Rate limit window length in seconds
    pub checkout_rate_window_secs: u64,

    /// Allowed browser origin; any origin when unset
    pub cors_origin: Option<String>,

    /// Bearer token for admin and kitchen routes; open when unset
    #[serde(skip_serializing)]
    pub admin_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            port: 3000,
            database_path: "./pizzeria.db".to_string(),
            tax_rate_bps: 0,
            delivery_fee_cents: 300,
            kitchen_poll_secs: 5,
            kitchen_late_minutes: 20,
            checkout_rate_limit: 5,
            checkout_rate_window_secs: 60,
            cors_origin: None,
            admin_token: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            port: parse_var("PORT", defaults.port)?,
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            tax_rate_bps: parse_var("TAX_RATE_BPS", defaults.tax_rate_bps)?,
            delivery_fee_cents: parse_var("DELIVERY_FEE_CENTS", defaults.delivery_fee_cents)?,
            kitchen_poll_secs: parse_var("KITCHEN_POLL_SECS", defaults.kitchen_poll_secs)?,
            kitchen_late_minutes: parse_var(
                "KITCHEN_LATE_MINUTES",
                defaults.kitchen_late_minutes,
            )?,
            checkout_rate_limit: parse_var("CHECKOUT_RATE_LIMIT", defaults.checkout_rate_limit)?,
            checkout_rate_window_secs: parse_var(
                "CHECKOUT_RATE_WINDOW_SECS",
                defaults.checkout_rate_window_secs,
            )?,
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|o| !o.trim().is_empty()),
            admin_token: env::var("ADMIN_TOKEN").ok().filter(|t| !t.trim().is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that parsing alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if validate_tax_rate_bps(self.tax_rate_bps).is_err() {
            return Err(ConfigError::InvalidValue("TAX_RATE_BPS".to_string()));
        }
        if self.delivery_fee_cents < 0 {
            return Err(ConfigError::InvalidValue("DELIVERY_FEE_CENTS".to_string()));
        }
        if self.kitchen_poll_secs == 0 {
            return Err(ConfigError::InvalidValue("KITCHEN_POLL_SECS".to_string()));
        }
        if self.checkout_rate_limit == 0 {
            return Err(ConfigError::InvalidValue("CHECKOUT_RATE_LIMIT".to_string()));
        }
        if self.checkout_rate_window_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "CHECKOUT_RATE_WINDOW_SECS".to_string(),
            ));
        }
        if let Some(origin) = &self.cors_origin {
            if HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::InvalidValue("CORS_ORIGIN".to_string()));
            }
        }
        Ok(())
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    pub fn delivery_fee(&self) -> Money {
        Money::from_cents(self.delivery_fee_cents)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delivery_fee().cents(), 300);
        assert_eq!(config.tax_rate().bps(), 0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ApiConfig {
            checkout_rate_limit: 0,
            ..ApiConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(name)) if name == "CHECKOUT_RATE_LIMIT"
        ));

        let config = ApiConfig {
            delivery_fee_cents: -1,
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ApiConfig {
            tax_rate_bps: 20_000,
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let port: u16 = parse_var("PIZZERIA_TEST_UNSET_VARIABLE", 8080).unwrap();
        assert_eq!(port, 8080);
    }
}
