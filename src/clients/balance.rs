//! Balance service client - notifies the downstream balance keeper.

use async_trait::async_trait;

use crate::clients::{APIGW_HEADER, transport_error};
use crate::error::AppError;
use crate::models::statement::AccountStatement;

/// Pushes the enriched debit to the balance service.
///
/// The call is not idempotent and is not retried: if it fails, the whole
/// booking aborts and rolls back. The notification itself is not
/// compensated on a later rollback, a known consistency gap inherited
/// from the upstream design.
#[async_trait]
pub trait BalanceNotifier: Send + Sync {
    async fn notify_debit(&self, debit: &AccountStatement) -> Result<(), AppError>;
}

/// reqwest-backed notifier: `POST {url}` with the debit as JSON body.
pub struct HttpBalanceNotifier {
    client: reqwest::Client,
    url: String,
    api_id: String,
}

impl HttpBalanceNotifier {
    pub fn new(client: reqwest::Client, url: String, api_id: String) -> Self {
        Self {
            client,
            url,
            api_id,
        }
    }
}

#[async_trait]
impl BalanceNotifier for HttpBalanceNotifier {
    async fn notify_debit(&self, debit: &AccountStatement) -> Result<(), AppError> {
        tracing::debug!("notifying balance service at {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header(APIGW_HEADER, &self.api_id)
            .json(debit)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::from_downstream_status(status));
        }
        Ok(())
    }
}
