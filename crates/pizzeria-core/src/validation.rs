//! # Validation Module
//!
//! Input validation for everything the storefront and admin screens send.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (React)                                             │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API handler (Rust)                                           │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators that normalize their input (names, phones, search queries)
//! return the cleaned value so callers store exactly what was checked.
//!
//! ## Usage
//! ```rust
//! use pizzeria_core::validation::{validate_phone, validate_quantity};
//!
//! assert_eq!(validate_phone("(555) 123-4567").unwrap(), "5551234567");
//! assert!(validate_quantity(3).is_ok());
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted menu item / category / group / option name.
pub const MAX_NAME_LEN: usize = 120;

/// Longest accepted free-text note (special instructions, order notes).
pub const MAX_NOTE_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required name-like field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `max` characters
///
/// ## Example
/// ```rust
/// use pizzeria_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Meat Lovers ", 120).unwrap(), "Meat Lovers");
/// assert!(validate_name("name", "   ", 120).is_err());
/// ```
pub fn validate_name(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates optional free text, trimming it and mapping blank to `None`.
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// Validates a phone number and returns its digits.
///
/// ## Rules
/// - Spaces, dashes, dots, parentheses and a leading `+` are stripped
/// - What remains must be 10 to 15 digits
///
/// The digits-only form is what orders and customers are keyed on.
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let mut digits = String::with_capacity(phone.len());
    for (idx, c) in phone.chars().enumerate() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            '+' if idx == 0 => {}
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: "phone".to_string(),
                    reason: "must contain only digits and separators".to_string(),
                })
            }
        }
    }

    if !(10..=15).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must have 10 to 15 digits".to_string(),
        });
    }

    Ok(digits)
}

/// Validates an email address.
///
/// Deliberately loose: one `@`, something before it, a dotted domain after.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(email.to_lowercase())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all/default results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (99)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a menu price in cents.
///
/// ## Rules
/// - Must be within `0..=MAX_PRICE_CENTS`
/// - Zero is allowed (free sides, free toppings)
///
/// ## Example
/// ```rust
/// use pizzeria_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1499).is_ok());  // $14.99
/// assert!(validate_price_cents(0).is_ok());     // Free
/// assert!(validate_price_cents(-100).is_err()); // Invalid
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates an option's price modifier. Negative modifiers ("no cheese")
/// are allowed down to `-MAX_PRICE_CENTS`.
pub fn validate_price_modifier_cents(cents: i64) -> ValidationResult<()> {
    if !(-MAX_PRICE_CENTS..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "priceModifierCents".to_string(),
            min: -MAX_PRICE_CENTS,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates a promotion percentage in basis points.
///
/// Unlike tax, a 0% promotion is pointless and rejected.
pub fn validate_percent_bps(field: &str, bps: i64) -> ValidationResult<()> {
    if !(1..=10000).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines sent for a quote or checkout.
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if lines > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use pizzeria_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "Cheese Pizza", 120).unwrap(), "Cheese Pizza");
        assert_eq!(
            validate_name("name", "", 120),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );
        assert!(validate_name("name", &"A".repeat(121), 120).is_err());
        assert!(validate_name("name", &"A".repeat(120), 120).is_ok());
    }

    #[test]
    fn test_validate_optional_text() {
        assert_eq!(validate_optional_text("notes", None, 10).unwrap(), None);
        assert_eq!(validate_optional_text("notes", Some("   "), 10).unwrap(), None);
        assert_eq!(
            validate_optional_text("notes", Some(" ring bell "), 10).unwrap(),
            Some("ring bell".to_string())
        );
        assert!(validate_optional_text("notes", Some("way too long here"), 10).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("555-123-4567").unwrap(), "5551234567");
        assert_eq!(validate_phone("+1 (555) 123.4567").unwrap(), "15551234567");

        assert!(validate_phone("").is_err());
        assert!(validate_phone("555-1234").is_err());
        assert!(validate_phone("555-123-456x").is_err());
        assert!(validate_phone("1234567890123456").is_err());
        assert!(validate_phone("555+1234567").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" Tony@Example.com ").unwrap(), "tony@example.com");
        assert!(validate_email("").is_err());
        assert!(validate_email("tony").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("tony@example").is_err());
        assert!(validate_email("tony@@example.com").is_err());
        assert!(validate_email("to ny@example.com").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_price_modifier_cents() {
        assert!(validate_price_modifier_cents(-50).is_ok());
        assert!(validate_price_modifier_cents(0).is_ok());
        assert!(validate_price_modifier_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_modifier_cents(-MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_modifier_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_price_modifier_cents(i64::MAX).is_err());
        assert!(validate_price_modifier_cents(i64::MIN).is_err());
    }

    #[test]
    fn test_validate_percent_bps() {
        assert!(validate_percent_bps("value", 5000).is_ok());
        assert!(validate_percent_bps("value", 10000).is_ok());
        assert!(validate_percent_bps("value", 0).is_err());
        assert!(validate_percent_bps("value", 10001).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(1).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES).is_ok());
        assert!(validate_cart_size(0).is_err());
        assert!(validate_cart_size(MAX_CART_LINES + 1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(825).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  pepperoni ").unwrap(), "pepperoni");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }
}
