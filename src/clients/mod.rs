//! Typed clients for the downstream services.
//!
//! Each downstream concern gets its own trait so the orchestrator never
//! sees raw HTTP: the client owns its base URL and gateway routing
//! header, decodes the typed payload, and classifies non-2xx statuses
//! into the domain error taxonomy.

/// Account service client
pub mod account;
/// Balance service client
pub mod balance;
/// Fee service client
pub mod fees;

use std::time::Duration;

use crate::error::AppError;

/// Routing header identifying the target gateway route on every
/// outbound call.
pub const APIGW_HEADER: &str = "x-apigw-api-id";

/// Shared HTTP client for all downstream calls.
///
/// One pooled `reqwest::Client` keeps connections warm across requests;
/// per-request and connect timeouts bound every suspension point.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(timeout)
        .build()
        .map_err(|err| {
            tracing::error!("failed to build http client: {err}");
            AppError::Server
        })
}

/// Decode a 2xx response body, or classify the status into a domain error.
pub(crate) async fn decode_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::from_downstream_status(status));
    }
    response.json::<T>().await.map_err(|err| {
        tracing::error!("failed to decode downstream payload: {err}");
        AppError::Server
    })
}

/// Transport-level failures (timeout, connection refused) are server
/// errors; there is no status code to classify.
pub(crate) fn transport_error(err: reqwest::Error) -> AppError {
    tracing::error!("downstream transport error: {err}");
    AppError::Server
}
