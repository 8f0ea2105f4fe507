//! Typed domain errors.
//!
//! Two enums, layered: [`ValidationError`] for field-level input problems
//! and [`CoreError`] for business rule violations (which can also wrap a
//! validation failure). Storage errors live in the db crate; the HTTP
//! layer turns everything here into a 400-class response.

use thiserror::Error;

/// Business rule violations.
///
/// Everything in this enum is the caller's fault and answers with a
/// 400-class status; storage trouble is a different type entirely.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced product is missing — or soft-deleted, which reads
    /// the same from outside.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The customer on a sale request is missing or soft-deleted.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// A sale line asked for more units than the product has on hand.
    ///
    /// Carries the product name and both quantities so the caller can
    /// render an actionable message.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A sale was submitted without any lines. A sale's total must be
    /// positive and all of its information lives in the lines, so the
    /// zero-line case is rejected outright.
    #[error("Sale must contain at least one line")]
    EmptySale,

    /// No sale with that id.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// A field-level check failed before business logic ran.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Field-level input problems, raised before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience alias for core-level results.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product: "Olive Oil 1L".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Olive Oil 1L: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::Required {
                field: "name".to_string()
            }
            .to_string(),
            "name is required"
        );
        assert_eq!(
            ValidationError::TooLong {
                field: "name".to_string(),
                max: 100
            }
            .to_string(),
            "name must be at most 100 characters"
        );
    }

    #[test]
    fn test_validation_wraps_into_core() {
        let core: CoreError = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into();
        assert!(matches!(core, CoreError::Validation(_)));
    }
}
