//! Domain error types for the ficha server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use std::collections::BTreeMap;
use std::fmt;

use actix_web::{HttpResponse, ResponseError};

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (infrastructure, not caller input)
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid input data (single message)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Per-field validation failure for a section update
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(BTreeMap<String, String>),

    /// A domain invariant would be broken (two active fichas, illegal
    /// status transition, more than two identification documents)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Attachment store (S3) operation failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code, response_message) = match self {
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::NotFound(_) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
            ),
            AppError::InvalidInput(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                self.to_string(),
            ),
            AppError::Validation(fields) => {
                return HttpResponse::UnprocessableEntity().json(ValidationErrorResponse {
                    error: "VALIDATION_ERROR".to_string(),
                    fields: fields.clone(),
                });
            }
            AppError::InvariantViolation(_) => (
                actix_web::http::StatusCode::CONFLICT,
                "INVARIANT_VIOLATION",
                self.to_string(),
            ),
            AppError::Unauthorized(_) => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                self.to_string(),
            ),
            AppError::Forbidden(_) => (
                actix_web::http::StatusCode::FORBIDDEN,
                "FORBIDDEN",
                self.to_string(),
            ),
            AppError::Storage(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                self.to_string(),
            ),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching the OpenAPI schema.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Validation error response: one message per offending field.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub fields: BTreeMap<String, String>,
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("Invalid UUID: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_counts_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("rut".to_string(), "Formato de RUT inválido".to_string());
        fields.insert("correo_personal".to_string(), "Email inválido".to_string());
        let err = AppError::Validation(fields);
        assert_eq!(err.to_string(), "Validation failed for 2 field(s)");
    }

    #[test]
    fn test_not_found_display() {
        let err = AppError::NotFound("Ficha 42".to_string());
        assert_eq!(err.to_string(), "Ficha 42 not found");
    }
}
