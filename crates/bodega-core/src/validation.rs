//! Field-level input validation.
//!
//! These checks run in the HTTP handlers before any storage call, so bad
//! input never reaches a repository. They are the first of three guard
//! layers: handler validation here, business checks inside the sale
//! transaction, and finally the schema's own constraints (NOT NULL,
//! UNIQUE, `CHECK (stock >= 0)`, foreign keys). Each layer catches what
//! the previous one can't see.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted display name for categories, products, and customers.
pub const MAX_NAME_LEN: usize = 100;

/// Checks an entity display name: non-blank, at most [`MAX_NAME_LEN`]
/// characters.
///
/// ```rust
/// use bodega_core::validation::validate_name;
///
/// assert!(validate_name("Olive Oil 1L").is_ok());
/// assert!(validate_name("  ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let trimmed = name.trim();

    match trimmed.len() {
        0 => Err(ValidationError::Required {
            field: "name".to_string(),
        }),
        n if n > MAX_NAME_LEN => Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        }),
        _ => Ok(()),
    }
}

/// Checks that a free-form field (customer city, channel tag) is present.
pub fn validate_required(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Checks a sale line quantity: strictly positive.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Checks a price in cents: strictly positive. This store has no free
/// products.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Checks a stock level: zero ("out of stock") and up.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Checks that a string parses as a UUID.
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
