//! Storage-layer errors.
//!
//! [`DbError`] classifies what went wrong at the SQLite level, with the
//! constraint cases (unique, foreign key) pulled out of the raw driver
//! message so callers can react to them. [`CheckoutError`] sits on top of
//! it for the sale coordinator, which can fail either on a business rule
//! or on storage — the HTTP layer answers 400 for the former and 500 for
//! the latter.

use bodega_core::CoreError;
use thiserror::Error;

/// Storage operation failures.
#[derive(Debug, Error)]
pub enum DbError {
    /// No live row with that id. Soft-deleted rows land here too, since
    /// live-set queries filter them out.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE constraint fired — duplicate category name, or a product
    /// repeated within one sale (composite line key).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A foreign key constraint fired, e.g. a product pointing at a
    /// category id that doesn't exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Commit (or rollback) itself failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Shorthand for the common not-found case.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Picks apart a SQLite driver error message into a constraint category.
///
/// SQLite reports constraints as text:
/// `UNIQUE constraint failed: <table>.<column>` and
/// `FOREIGN KEY constraint failed`.
fn classify_driver_error(message: &str) -> DbError {
    if let Some(field) = message.strip_prefix("UNIQUE constraint failed: ") {
        return DbError::UniqueViolation {
            field: field.to_string(),
            value: "unknown".to_string(),
        };
    }

    if message.contains("UNIQUE constraint failed") {
        return DbError::UniqueViolation {
            field: "unknown".to_string(),
            value: "unknown".to_string(),
        };
    }

    if message.contains("FOREIGN KEY constraint failed") {
        return DbError::ForeignKeyViolation {
            message: message.to_string(),
        };
    }

    DbError::QueryFailed(message.to_string())
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(driver) => classify_driver_error(driver.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for storage operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Checkout Error
// =============================================================================

/// Outcome classification for the sale transaction coordinator.
///
/// Both variants mean the transaction rolled back; the split only decides
/// who gets blamed. `Rejected` carries the whole [`CoreError`] family
/// (unknown or deleted product/customer, insufficient stock, empty line
/// list) and maps to a 400; `Storage` maps to a 500.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request broke a business rule; nothing was written.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Storage failed underneath the coordinator; the transaction was
    /// rolled back.
    #[error(transparent)]
    Storage(#[from] DbError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        CheckoutError::Storage(DbError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Product", "abc-123");
        assert_eq!(err.to_string(), "Product not found: abc-123");
    }

    #[test]
    fn test_driver_error_classification() {
        assert!(matches!(
            classify_driver_error("UNIQUE constraint failed: categories.name"),
            DbError::UniqueViolation { field, .. } if field == "categories.name"
        ));
        assert!(matches!(
            classify_driver_error("FOREIGN KEY constraint failed"),
            DbError::ForeignKeyViolation { .. }
        ));
        assert!(matches!(
            classify_driver_error("no such table: nothing"),
            DbError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_checkout_error_keeps_rejection_message() {
        let err = CheckoutError::Rejected(CoreError::EmptySale);
        assert_eq!(err.to_string(), "Sale must contain at least one line");
    }
}
