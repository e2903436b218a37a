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
/// This enum represents all possible errors that can occur in the service.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Validation errors**: Detected before any I/O (`TransactionInvalid`,
///   `InvalidAmount`)
/// - **Downstream classifications**: Non-2xx answers from remote services
///   (`NotFound`, `Unauthorized`, `Forbidden`, `Server`)
/// - **Transport/decoding**: Malformed inbound bodies (`Unmarshal`)
/// - **Database errors**: Any sqlx::Error from ledger operations
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Requested item does not exist (usually the account id could not
    /// be resolved by the account service).
    ///
    /// Returns HTTP 404 Not Found.
    #[error("item not found")]
    NotFound,

    /// A downstream service rejected the call as unauthorized.
    ///
    /// Classification only: surfaces to callers as HTTP 500, because
    /// the caller's own request was well-formed.
    #[error("not authorized")]
    Unauthorized,

    /// A downstream service rejected the call as forbidden.
    ///
    /// Classification only; surfaces as HTTP 500, same as `Unauthorized`.
    #[error("forbidden request")]
    Forbidden,

    /// Transaction type tag is not `"DEBIT"`.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("transaction invalid")]
    TransactionInvalid,

    /// Positive amount supplied for a debit.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("invalid amount for this transaction type")]
    InvalidAmount,

    /// Catch-all for downstream 5xx responses and transport failures
    /// (timeout, connection refused).
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("server identified error")]
    Server,

    /// Request body or parameters could not be decoded.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("unmarshal error: {0}")]
    Unmarshal(String),

    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Classify a downstream HTTP status into a domain error.
    ///
    /// Applied to every non-2xx answer from the account, balance and fee
    /// services. Anything not explicitly mapped is a server error.
    pub fn from_downstream_status(status: reqwest::StatusCode) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED => AppError::Unauthorized,
            reqwest::StatusCode::FORBIDDEN => AppError::Forbidden,
            reqwest::StatusCode::NOT_FOUND => AppError::NotFound,
            _ => AppError::Server,
        }
    }

    /// HTTP status this error maps to on the inbound surface.
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unmarshal(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::TransactionInvalid | AppError::InvalidAmount => StatusCode::CONFLICT,
            // Unauthorized/Forbidden classify downstream answers, not the
            // caller's request; they fall into the 500 bucket with the rest.
            AppError::Unauthorized
            | AppError::Forbidden
            | AppError::Server
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
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
///   "status_code": 409,
///   "msg": "transaction invalid"
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Database details stay server-side; the client sees a generic message
        let message = match self {
            AppError::Database(ref err) => {
                tracing::error!("database error: {err}");
                "internal database error".to_string()
            }
            ref other => other.to_string(),
        };

        let body = Json(json!({
            "status_code": status.as_u16(),
            "msg": message
        }));

        (status, body).into_response()
    }
}
