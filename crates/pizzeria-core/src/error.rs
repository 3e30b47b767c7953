//! # Error Types
//!
//! Domain-specific error types for pizzeria-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pizzeria-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── PricingError     - Customization selections that break the rules  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pizzeria-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  pizzeria-api errors (in app)                                          │
//! │  └── ApiError         - What the storefront sees (status + JSON)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Menu item cannot be found (or was soft-deleted).
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    /// Menu item exists but is not currently sold.
    #[error("Menu item is not available: {0}")]
    MenuItemUnavailable(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Promotion not found.
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// The kitchen tried to move an order along an edge that doesn't exist.
    ///
    /// ## When This Occurs
    /// - Marking a `pending` order `ready` without confirming it first
    /// - Touching an order that is already `completed` or `cancelled`
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: String,
        to: String,
    },

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Cart line id is not in the cart.
    #[error("Cart line not found: {0}")]
    CartLineNotFound(String),

    /// Customization selections were rejected.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Pricing Error
// =============================================================================

/// Errors raised while pricing a customized menu item.
///
/// Every variant names the offending group or option so the builder UI can
/// highlight it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// The option isn't offered for this item (or is inactive).
    #[error("Option {option_id} is not available for this item")]
    UnknownOption { option_id: String },

    /// Option multiplier outside `1..=max`.
    #[error("Option {option_id} quantity {quantity} must be between 1 and {max}")]
    InvalidOptionQuantity {
        option_id: String,
        quantity: i64,
        max: i64,
    },

    /// More distinct options than the group allows.
    #[error("{group} allows at most {max} selection(s), got {selected}")]
    TooManySelections {
        group: String,
        max: i64,
        selected: i64,
    },

    /// Fewer distinct options than the group requires.
    #[error("{group} requires at least {min} selection(s), got {selected}")]
    TooFewSelections {
        group: String,
        min: i64,
        selected: i64,
    },

    /// A single-select option was given a multiplier.
    #[error("{group} is single-select; option quantity must be 1")]
    SingleSelectQuantity { group: String },

    /// Group limits are contradictory (admin input).
    #[error("{group} has invalid selection limits: {reason}")]
    InvalidGroupConfig { group: String, reason: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidStatusTransition {
            order_id: "A1".to_string(),
            from: "pending".to_string(),
            to: "ready".to_string(),
        };
        assert_eq!(err.to_string(), "Order A1 cannot move from pending to ready");
    }

    #[test]
    fn test_pricing_error_messages() {
        let err = PricingError::TooManySelections {
            group: "Toppings".to_string(),
            max: 3,
            selected: 4,
        };
        assert_eq!(
            err.to_string(),
            "Toppings allows at most 3 selection(s), got 4"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer_name".to_string(),
        };
        assert_eq!(err.to_string(), "customer_name is required");
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = PricingError::UnknownOption {
            option_id: "x".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Pricing(_)));
    }
}
