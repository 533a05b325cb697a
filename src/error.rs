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

use crate::store::StoreError;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Validation**: Malformed input, non-positive amounts, self-transfers
/// - **Not Found**: Unknown sender or receiver account
/// - **Conflict**: Duplicate username, insufficient funds
/// - **Unauthorized**: Missing/invalid/expired token, bad credentials
/// - **Rate Limited**: Quota exhausted for the current window
/// - **Internal**: Storage or signing failures (details hidden from clients)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// The debited account does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Sender account not found")]
    SenderNotFound,

    /// The credited account does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Receiver account not found")]
    ReceiverNotFound,

    /// Sender balance is smaller than the transfer amount.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("Insufficient balance")]
    InsufficientBalance,

    /// Registration attempted with a username that already exists.
    ///
    /// Returns HTTP 409 Conflict. A retried registration always lands here,
    /// it never overwrites the existing identity.
    #[error("Username already taken")]
    UsernameTaken,

    /// Authentication failed.
    ///
    /// Returns HTTP 401 Unauthorized with one generic message for every
    /// cause (missing token, bad signature, expired token, unknown user,
    /// wrong password). The specific cause is logged internally before this
    /// variant is constructed, never exposed in the response.
    #[error("Authentication failed")]
    Unauthorized,

    /// Client exceeded the request quota for the current window.
    ///
    /// Returns HTTP 429 Too Many Requests with retry metadata in both the
    /// body and the `Retry-After` / `X-RateLimit-*` headers.
    #[error("Rate limit exceeded")]
    RateLimited {
        limit: u32,
        window_secs: u64,
        retry_after_secs: u64,
    },

    /// Storage operation failed after internal retries were exhausted.
    ///
    /// Returns HTTP 500 Internal Server Error (hides details from client).
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing or token signing failed.
    ///
    /// Returns HTTP 500 Internal Server Error.
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
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::SenderNotFound => {
                (StatusCode::NOT_FOUND, "sender_not_found", self.to_string())
            }
            AppError::ReceiverNotFound => (
                StatusCode::NOT_FOUND,
                "receiver_not_found",
                self.to_string(),
            ),
            AppError::InsufficientBalance => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "insufficient_balance",
                self.to_string(),
            ),
            AppError::UsernameTaken => {
                (StatusCode::CONFLICT, "username_taken", self.to_string())
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
            ),
            AppError::RateLimited {
                limit,
                window_secs,
                retry_after_secs,
            } => {
                // Body carries the machine-readable retry hint; the matching
                // headers are attached by the rate limit middleware.
                let body = Json(json!({
                    "error": {
                        "code": "rate_limited",
                        "message": "Rate limit exceeded"
                    },
                    "limit": limit,
                    "window_secs": window_secs,
                    "retry_after": retry_after_secs
                }));
                return (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            }
            AppError::Store(ref err) => {
                tracing::error!("storage failure: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("internal failure: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
