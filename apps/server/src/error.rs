//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`; the conversions in this
//! module decide the status code once, in one place:
//!
//! - validation failures and business rejections (bad input, unknown
//!   product or customer, insufficient stock, empty sale) → **400**
//! - direct lookups that miss → **404**
//! - storage trouble → **500**, with the noisy detail logged server-side
//!   and a generic message sent to the client
//!
//! The sale coordinator's [`CheckoutError`] splits exactly along this
//! line: `Rejected` becomes a 400, `Storage` a 500.
//!
//! Clients always receive the same JSON shape:
//! `{ "code": "INSUFFICIENT_STOCK", "message": "…" }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use bodega_core::CoreError;
use bodega_db::{CheckoutError, DbError};

use crate::media::MediaError;

/// Error payload returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable code, stable across message rewording.
    pub code: ErrorCode,

    /// Human-readable message.
    pub message: String,
}

/// Machine-readable error codes, each pinned to one status.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// 404 — direct lookup missed.
    NotFound,

    /// 400 — bad input or an unusable referenced entity.
    ValidationError,

    /// 400 — requested quantity exceeds available stock.
    InsufficientStock,

    /// 500 — storage failed.
    DatabaseError,

    /// 500 — anything else.
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),

            // Constraint violations are the client's doing
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{field} '{value}' already exists"))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                ApiError::validation("Invalid reference")
            }

            // Everything else is ours; log the detail, keep the response vague
            other => {
                tracing::error!(error = %other, "Storage failure");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::SaleNotFound(_) => ErrorCode::NotFound,
            _ => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Rejected(core) => core.into(),
            CheckoutError::Storage(db) => db.into(),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        tracing::error!(error = %err, "Media store failure");
        ApiError::internal("Failed to store uploaded image")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ValidationError.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::InsufficientStock.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::DatabaseError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_checkout_split() {
        let rejected: ApiError = CheckoutError::Rejected(CoreError::InsufficientStock {
            product: "Olive Oil 1L".to_string(),
            available: 3,
            requested: 5,
        })
        .into();
        assert!(matches!(rejected.code, ErrorCode::InsufficientStock));

        let storage: ApiError =
            CheckoutError::Storage(DbError::TransactionFailed("disk full".to_string())).into();
        assert!(matches!(storage.code, ErrorCode::DatabaseError));
    }

    #[test]
    fn test_core_errors_are_bad_requests() {
        let err: ApiError = CoreError::ProductNotFound("p1".to_string()).into();
        assert!(matches!(err.code, ErrorCode::ValidationError));
        assert_eq!(err.message, "Product not found: p1");
    }
}
