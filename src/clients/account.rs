//! Account service client - resolves external account identifiers.

use async_trait::async_trait;

use crate::clients::{APIGW_HEADER, decode_response, transport_error};
use crate::error::AppError;
use crate::models::account::Account;

/// Maps an opaque external account identifier to the internal numeric
/// account key via the account service.
#[async_trait]
pub trait AccountResolver: Send + Sync {
    async fn resolve(&self, account_id: &str) -> Result<Account, AppError>;
}

/// reqwest-backed resolver: `GET {base_url}/{account_id}`.
pub struct HttpAccountResolver {
    client: reqwest::Client,
    base_url: String,
    api_id: String,
}

impl HttpAccountResolver {
    pub fn new(client: reqwest::Client, base_url: String, api_id: String) -> Self {
        Self {
            client,
            base_url,
            api_id,
        }
    }
}

#[async_trait]
impl AccountResolver for HttpAccountResolver {
    async fn resolve(&self, account_id: &str) -> Result<Account, AppError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), account_id);
        tracing::debug!("resolving account via {url}");

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
