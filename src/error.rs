// =============================================================================
// ERROR MODULE
// =============================================================================
// This module defines custom error types and their HTTP responses.
//
// LEARNING NOTES:
// - Rust doesn't have exceptions; it uses Result<T, E> for error handling
// - thiserror crate makes defining error types easy
// - We convert our errors to HTTP responses using Axum's IntoResponse
//
// ERROR HANDLING PHILOSOPHY:
// - Errors should be informative but not leak internal details
// - Use typed errors instead of stringly-typed errors
// - Map errors to appropriate HTTP status codes
// - No automatic retries: every failure is terminal for that operation and
//   surfaced to the caller as a categorized response
// =============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::validation::FieldErrors;

// =============================================================================
// CUSTOM ERROR TYPE
// =============================================================================
// This enum defines all possible errors in our service.
//
// The #[error("...")] attribute from thiserror automatically implements
// Display, and #[from] auto-implements From<X> for conversion.
#[derive(Debug, Error)]
pub enum AppError {
    // -------------------------------------------------------------------------
    // CLIENT ERRORS
    // -------------------------------------------------------------------------
    /// One or more payload fields failed validation (all reported together)
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// SKU (or email) uniqueness violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No record at the given identifier
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identifier or payload shape unusable before validation even runs
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Credential verification failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // -------------------------------------------------------------------------
    // SERVER ERRORS
    // -------------------------------------------------------------------------
    /// The persistence layer itself failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error code used in response bodies and logs
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MalformedInput(_) => "MALFORMED_INPUT",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// =============================================================================
// HTTP RESPONSE CONVERSION
// =============================================================================
// Axum uses the IntoResponse trait to convert types into HTTP responses.
// By implementing this for AppError, handlers can simply return
// Result<Json<T>, AppError> and errors become proper HTTP responses.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            // 400 with the full field -> message map
            AppError::Validation(fields) => {
                let summary = fields
                    .values()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                ErrorResponse::with_fields(code, summary, fields.clone())
            }

            AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::MalformedInput(msg)
            | AppError::Unauthorized(msg) => ErrorResponse::new(code, msg.clone()),

            // 500: don't expose internal details to clients
            AppError::Database(_) => {
                ErrorResponse::new(code, "A database error occurred".to_string())
            }

            AppError::Internal(msg) => ErrorResponse::new(code, msg.clone()),
        };

        // Log the failure; client errors at warn, server errors at error
        if status.is_server_error() {
            tracing::error!(error_code = code, error = %self, "Request failed");
        } else {
            tracing::warn!(error_code = code, error = %self, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================
// A convenient type alias for Results that use our error type.
pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// CONVERSION HELPERS
// =============================================================================

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldErrors;

    #[test]
    fn test_status_mapping() {
        let mut fields = FieldErrors::new();
        fields.insert("price", "Price must be greater than 0".to_string());

        assert_eq!(
            AppError::Validation(fields).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("SKU already exists".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotFound("no such product".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::MalformedInput("bad id".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("bad credentials".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error_keeps_all_fields_in_response() {
        let mut fields = FieldErrors::new();
        fields.insert("price", "Price must be greater than 0".to_string());
        fields.insert("quantity", "Quantity must be a whole number".to_string());

        let response = AppError::Validation(fields).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::Conflict("x".into()).code(), "CONFLICT");
        assert_eq!(AppError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(
            AppError::MalformedInput("x".into()).code(),
            "MALFORMED_INPUT"
        );
    }
}
