//! Fee service client - fee scripts and per-key fee definitions.

use async_trait::async_trait;

use crate::clients::{APIGW_HEADER, decode_response, transport_error};
use crate::error::AppError;
use crate::models::fee::{Fee, Script};

/// Supplies the named fee script for a transaction type and, per key,
/// the fee definition (name + percentage).
#[async_trait]
pub trait FeeProvider: Send + Sync {
    /// Fetch the script (ordered fee keys) stored under `script_key`.
    async fn fetch_script(&self, script_key: &str) -> Result<Script, AppError>;

    /// Fetch one fee definition by key.
    async fn fetch_fee(&self, fee_key: &str) -> Result<Fee, AppError>;
}

/// reqwest-backed provider: `GET {base_url}/{key}` for both shapes.
pub struct HttpFeeProvider {
    client: reqwest::Client,
    base_url: String,
    api_id: String,
}

impl HttpFeeProvider {
    pub fn new(client: reqwest::Client, base_url: String, api_id: String) -> Self {
        Self {
            client,
            base_url,
            api_id,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), key);
        tracing::debug!("fetching fee data via {url}");

        let response = self
            .client
            .get(&url)
            .header(APIGW_HEADER, &self.api_id)
            .send()
            .await
            .map_err(transport_error)?;

        decode_response(response).await
    }
}

#[async_trait]
impl FeeProvider for HttpFeeProvider {
    async fn fetch_script(&self, script_key: &str) -> Result<Script, AppError> {
        self.get_json(script_key).await
    }

    async fn fetch_fee(&self, fee_key: &str) -> Result<Fee, AppError> {
        self.get_json(fee_key).await
    }
}
