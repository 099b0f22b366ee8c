//! # API Error Type
//!
//! Unified error type returned by every backoffice service.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Backoffice                         │
//! │                                                                         │
//! │  Service method                                                         │
//! │  Result<T, ApiError>                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Database Error? ──── DbError::QueryFailed("...") ──┐                   │
//! │         │                                           │                   │
//! │         ▼                                           ▼                   │
//! │  Business rule? ──── CoreError::PositionCycle ──── ApiError ──► caller  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Commission engine failed? ─── "Failed to create sale" (logged)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers receive a machine-readable `code` and a human-readable
//! `message`:
//! ```json
//! {
//!   "code": "NOT_FOUND",
//!   "message": "Seller not found: 7b0c..."
//! }
//! ```

use serde::Serialize;
use ts_rs::TS;

use comissio_core::{CoreError, ValidationError};
use comissio_db::DbError;

/// API error returned from backoffice services.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Record already exists (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Business rule violated (422)
    BusinessLogic,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a business logic error.
    pub fn business(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BusinessLogic, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SellerNotFound(id) => ApiError::not_found("Seller", &id),
            CoreError::PositionNotFound(id) => ApiError::not_found("Position", &id),
            CoreError::EmployeeNotFound(id) => ApiError::not_found("Employee", &id),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", &id),
            e @ CoreError::PositionCycle { .. } => ApiError::business(e.to_string()),
            e @ CoreError::CompanyMismatch { .. } => ApiError::business(e.to_string()),
            e @ CoreError::SellerAlreadyExists(_) => {
                ApiError::new(ErrorCode::Conflict, e.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result alias for service methods.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_code_and_message() {
        let err = ApiError::not_found("Seller", "abc");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Seller not found: abc");
    }

    #[test]
    fn test_db_errors_hide_details() {
        let err = ApiError::from(DbError::QueryFailed("near \"SELEC\": syntax error".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");

        let err = ApiError::from(DbError::duplicate("employee_id", "e1"));
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[test]
    fn test_core_errors() {
        let err = ApiError::from(CoreError::PositionCycle {
            position_id: "a".into(),
            parent_id: "b".into(),
        });
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let err = ApiError::from(ValidationError::Required {
            field: "name".into(),
        });
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "name is required");

        let err = ApiError::from(CoreError::SellerAlreadyExists("e1".into()));
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.to_string(), "[Conflict] Employee e1 already has a seller policy");
    }
}
