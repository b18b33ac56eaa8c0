//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Handler: Result<Json<T>, ApiError>                                     │
//! │         │                                                               │
//! │         ├── DbError::NotFound ───────────────► 404 NOT_FOUND            │
//! │         ├── DbError::UniqueViolation ────────► 409 CONFLICT             │
//! │         ├── DbError::ForeignKeyViolation ────► 409 CONFLICT             │
//! │         ├── DbError::Rule(CoreError) ──┐                                │
//! │         │                              ├─ Validation ► 400              │
//! │         │                              ├─ EmptyCart ─► 422              │
//! │         │                              └─ Insufficient stock ► 422      │
//! │         ├── missing/invalid token ───────────► 401 UNAUTHENTICATED      │
//! │         ├── customer on admin route ─────────► 403 PERMISSION_DENIED    │
//! │         └── anything else ───────────────────► 500 INTERNAL (logged)    │
//! │                                                                         │
//! │  Response body:                                                         │
//! │    { "code": "INSUFFICIENT_STOCK",                                      │
//! │      "message": "Insufficient stock for Jean Slim (M): ..." }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use styleyoung_core::{CoreError, ValidationError};
use styleyoung_db::DbError;
use styleyoung_reports::ReportError;

/// Error body returned by every failing route.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Missing or invalid session token (401)
    Unauthenticated,

    /// Staff-only route (403)
    PermissionDenied,

    /// Resource not found (404)
    NotFound,

    /// Duplicate or still-referenced record (409)
    Conflict,

    /// Business rule rejected the request (422)
    BusinessRule,

    /// Not enough units to fill a line (422)
    InsufficientStock,

    /// Checkout without cart lines (422)
    EmptyCart,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::BusinessRule | ErrorCode::InsufficientStock | ErrorCode::EmptyCart => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

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
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthenticated, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::PermissionDenied, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
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
            DbError::ForeignKeyViolation { message } => {
                ApiError::new(ErrorCode::Conflict, format!("Cannot complete: {}", message))
            }
            DbError::Rule(e) => ApiError::from(e),
            DbError::ConnectionFailed(e) | DbError::MigrationFailed(e) => {
                tracing::error!("Database unavailable: {}", e);
                ApiError::internal("Database unavailable")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::internal("Database operation failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::internal("Database busy, try again")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::SizeNotFound { .. } => ApiError::new(ErrorCode::NotFound, message),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, message)
            }
            CoreError::EmptyCart => ApiError::new(ErrorCode::EmptyCart, message),
            CoreError::CartTooLarge { .. } => ApiError::new(ErrorCode::BusinessRule, message),
            CoreError::InvalidOrderStatus(_) | CoreError::QuantityTooLarge { .. } => {
                ApiError::validation(message)
            }
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::UnknownFormat(_) => ApiError::validation(err.to_string()),
            other => {
                tracing::error!("Report rendering failed: {}", other);
                ApiError::internal("Report rendering failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
