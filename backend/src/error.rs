//! Error handling for the Smart Inventory server
//!
//! Business-rule violations surface as typed errors with their detail;
//! persistence failures are logged and reported generically.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::StockError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Ledger rule violations
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i32,
        requested: i32,
    },

    #[error("Invalid movement type: {0}")]
    InvalidMovementType(String),

    #[error("Product {0} is inactive")]
    ProductInactive(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(resource: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Conflict {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        let field = err.field();
        match err {
            StockError::InsufficientStock {
                sku,
                available,
                requested,
            } => AppError::InsufficientStock {
                sku,
                available,
                requested,
            },
            StockError::InvalidMovementType(name) => AppError::InvalidMovementType(name),
            StockError::ProductNotFound(sku) => AppError::NotFound(format!("Product '{}'", sku)),
            StockError::ProductInactive(sku) => AppError::ProductInactive(sku),
            other => AppError::Validation {
                field: field.unwrap_or("request").to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let first = errors.field_errors().into_iter().next().map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for {}", field));
            (field.to_string(), message)
        });

        match first {
            Some((field, message)) => AppError::Validation { field, message },
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Turn a shared validation helper result into a field-level error
pub fn validate_field(field: &str, result: Result<(), &'static str>) -> AppResult<()> {
    result.map_err(|message| AppError::validation(field, message))
}

/// Field-named checks such as `Pagination::validate`
pub fn validate_named(result: Result<(), (&'static str, &'static str)>) -> AppResult<()> {
    result.map_err(|(field, message)| AppError::validation(field, message))
}

/// Map a unique-constraint violation to `Conflict`, naming the clashing field
pub fn map_unique_violation(err: sqlx::Error, resource: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            let field = UNIQUE_CONSTRAINTS
                .iter()
                .find(|(name, _)| *name == constraint)
                .map(|(_, field)| *field)
                .unwrap_or("value");
            return AppError::conflict(
                resource,
                format!("A {} with this {} already exists", resource, field),
            );
        }
    }
    err.into()
}

/// Unique constraints declared in the migrations and the field each guards
const UNIQUE_CONSTRAINTS: &[(&str, &str)] = &[
    ("products_pkey", "SKU"),
    ("products_barcode_key", "barcode"),
    ("users_username_key", "username"),
    ("users_email_key", "email"),
    ("categories_name_key", "name"),
    ("sale_transactions_transaction_number_key", "transaction number"),
];

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            details: None,
        }
    }
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorDetail::new("UNAUTHORIZED", msg.clone()))
            }
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, ErrorDetail::new("FORBIDDEN", msg.clone()))
            }
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::Conflict { resource, message } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    field: Some(resource.clone()),
                    ..ErrorDetail::new("CONFLICT", message.clone())
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::InsufficientStock {
                sku,
                available,
                requested,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    details: Some(serde_json::json!({
                        "sku": sku,
                        "available": available,
                        "requested": requested,
                    })),
                    ..ErrorDetail::new(
                        "INSUFFICIENT_STOCK",
                        format!(
                            "Insufficient stock for {}. Available: {}, requested: {}",
                            sku, available, requested
                        ),
                    )
                },
            ),
            AppError::InvalidMovementType(name) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some("movement_type".to_string()),
                    ..ErrorDetail::new(
                        "INVALID_MOVEMENT_TYPE",
                        format!(
                            "Invalid movement type '{}'. Must be one of: adjustment, damage, return",
                            name
                        ),
                    )
                },
            ),
            AppError::ProductInactive(sku) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "PRODUCT_INACTIVE",
                    format!("Product '{}' is inactive", sku),
                ),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(_) | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_maps_to_bad_request_with_detail() {
        let err: AppError = StockError::InsufficientStock {
            sku: "WID-1".to_string(),
            available: 25,
            requested: 26,
        }
        .into();
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.code, "INSUFFICIENT_STOCK");
        let details = detail.details.unwrap();
        assert_eq!(details["available"], 25);
        assert_eq!(details["requested"], 26);
    }

    #[test]
    fn missing_product_maps_to_not_found() {
        let err: AppError = StockError::ProductNotFound("X".to_string()).into();
        assert_eq!(err.status_and_detail().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn empty_sale_is_a_validation_error_on_items() {
        let err: AppError = StockError::EmptySale.into();
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.field.as_deref(), Some("items"));
    }

    #[test]
    fn persistence_failures_are_not_leaked() {
        let err = AppError::Internal("connection reset by peer".to_string());
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!detail.message.contains("connection reset"));
    }
}
