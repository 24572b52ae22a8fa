//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Validation Errors**: Missing or malformed request data
/// - **Resource Errors**: Requested resources not found (or hidden from
///   the public surface because they are out of stock)
/// - **Authentication Errors**: Bad login credentials or bad/missing tokens
/// - **Storage Errors**: Object-storage upload failures
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request. The String echoes the violated
    /// constraint (e.g. "Name required").
    #[error("{0}")]
    Validation(String),

    /// Requested resource does not exist.
    ///
    /// Returns HTTP 404 Not Found. Also used for instruments that exist
    /// but are out of stock on the public path, so callers cannot tell
    /// the two cases apart.
    #[error("{0}")]
    NotFound(&'static str),

    /// Login failed. Unknown email and wrong password are deliberately
    /// indistinguishable to avoid account enumeration.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Session token is missing, malformed, expired, or references a
    /// deleted account.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Object-storage upload failed or the backend is not configured.
    ///
    /// Returns HTTP 500. The String carries the backend detail for the
    /// server log; the client sees a generic upload-failure message.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Unclassified internal failure.
    ///
    /// Returns HTTP 500 with a generic message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// All errors return JSON with a top-level `message` field:
/// ```json
/// { "message": "Human-readable error message" }
/// ```
///
/// # Status Code Mapping
///
/// - `Validation`, `InvalidCredentials` → 400 Bad Request
/// - `Unauthorized` → 401 Unauthorized
/// - `NotFound` → 404 Not Found
/// - `Database`, `StorageUnavailable`, `Internal` → 500 (details are
///   logged server-side and hidden from the client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidCredentials => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            AppError::StorageUnavailable(ref detail) => {
                tracing::error!("object storage failure: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to upload file".to_string(),
                )
            }
            AppError::Database(ref err) => {
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                )
            }
            AppError::Internal(ref detail) => {
                tracing::error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "message": message }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_and_echoes_constraint() {
        let response = AppError::Validation("Name required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_and_unavailable_are_both_404() {
        let missing = AppError::NotFound("Instrument not found").into_response();
        let hidden = AppError::NotFound("Instrument not available").into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn credential_failures_map_to_400() {
        let response = AppError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_failures_map_to_500() {
        let response = AppError::StorageUnavailable("bucket missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
