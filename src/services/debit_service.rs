//! Debit service - core orchestration for booking a debit.
//!
//! One booking spans a local ACID transaction and three remote services
//! with different failure-tolerance requirements:
//!
//! - account resolution, the debit insert, the balance notification and
//!   the fee script fetch are **hard** steps: any failure aborts the
//!   whole operation and rolls the transaction back;
//! - the per-key fee collection loop is **best-effort**: it runs behind
//!   a circuit breaker, and its failure degrades the response (an `obs`
//!   annotation) instead of failing it. The debit is never lost because
//!   of a fee-service outage.
//!
//! The commit decision is an explicit final step driven only by the
//! hard-step outcome; the soft fee-loop error never influences it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::breaker::{CircuitBreaker, CircuitBreakerError};
use crate::clients::account::AccountResolver;
use crate::clients::balance::BalanceNotifier;
use crate::clients::fees::FeeProvider;
use crate::error::AppError;
use crate::models::fee::{DEBIT_SCRIPT, Script};
use crate::models::statement::{AccountStatement, AccountStatementFee, DEBIT_TYPE, DebitRequest};
use crate::store::{LedgerStore, LedgerTx};

/// Orchestrates debit bookings and list reads.
///
/// All collaborators are injected at construction; the service holds no
/// other state. The circuit breaker instance is shared across requests
/// on purpose: its failure counters are global by design.
pub struct DebitService {
    store: Arc<dyn LedgerStore>,
    accounts: Arc<dyn AccountResolver>,
    balance: Arc<dyn BalanceNotifier>,
    fees: Arc<dyn FeeProvider>,
    breaker: Arc<CircuitBreaker>,
}

impl DebitService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        accounts: Arc<dyn AccountResolver>,
        balance: Arc<dyn BalanceNotifier>,
        fees: Arc<dyn FeeProvider>,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            store,
            accounts,
            balance,
            fees,
            breaker,
        }
    }

    /// Book a debit.
    ///
    /// # Process
    ///
    /// 1. Validate the request (no I/O before this passes)
    /// 2. Open a store transaction
    /// 3. Resolve the external account id to the internal key
    /// 4. Insert the debit row (store assigns id + charged_at)
    /// 5. Notify the balance service with the enriched debit
    /// 6. Fetch the fee script for `script.debit`
    /// 7. Collect fees per script key, guarded by the circuit breaker;
    ///    failures here only annotate the result
    /// 8. Commit if steps 2-6 succeeded, roll back otherwise
    ///
    /// # Errors
    ///
    /// - `TransactionInvalid`: type tag is not `"DEBIT"`
    /// - `InvalidAmount`: positive amount on a debit
    /// - `NotFound` / `Unauthorized` / `Forbidden` / `Server`: classified
    ///   downstream failures
    /// - `Database`: ledger errors
    pub async fn add_debit(&self, request: DebitRequest) -> Result<AccountStatement, AppError> {
        validate_debit(&request)?;

        let mut tx = self.store.begin().await?;

        // Transaction is finished on every path: commit on success,
        // rollback on any hard failure.
        let booked = self.book_debit(tx.as_mut(), &request).await;
        match booked {
            Ok(statement) => {
                tx.commit().await?;
                tracing::info!(
                    account_id = %request.account_id,
                    statement_id = statement.id,
                    "debit booked"
                );
                Ok(statement)
            }
            Err(err) => {
                tx.rollback().await?;
                tracing::warn!(account_id = %request.account_id, "debit aborted: {err}");
                Err(err)
            }
        }
    }

    /// Hard steps 3-6 plus the best-effort fee sub-flow.
    ///
    /// Any error returned here rolls the caller's transaction back; the
    /// fee sub-flow converts its own errors into the `obs` annotation
    /// instead of returning them.
    async fn book_debit(
        &self,
        tx: &mut dyn LedgerTx,
        request: &DebitRequest,
    ) -> Result<AccountStatement, AppError> {
        let account = self.accounts.resolve(&request.account_id).await?;

        let statement = AccountStatement {
            id: None,
            fk_account_id: account.id,
            account_id: Some(request.account_id.clone()),
            type_charge: request.type_charge.clone(),
            charged_at: None,
            currency: request.currency.clone(),
            amount: request.amount,
            tenant_id: request.tenant_id.clone(),
            transaction_id: Some(Uuid::new_v4()),
            obs: None,
        };

        let mut statement = tx.insert_debit(statement).await?;

        // Local write and notification must both succeed
        self.balance.notify_debit(&statement).await?;

        // Script fetch is a hard step; only the per-key loop is soft
        let script = self.fees.fetch_script(DEBIT_SCRIPT).await?;

        let fee_outcome = self
            .breaker
            .execute(self.collect_fees(tx, &statement, &script))
            .await;

        match fee_outcome {
            Ok(booked) => {
                tracing::debug!(booked, "fee collection complete");
            }
            Err(CircuitBreakerError::Open) => {
                tracing::warn!("circuit breaker open, skipping fee collection");
                statement.obs =
                    Some("circuit breaker open, impossible to charge the fees".to_string());
            }
            Err(CircuitBreakerError::Inner(err)) => {
                tracing::warn!("fee collection failed: {err}");
                statement.obs = Some(format!("fee collection incomplete: {err}"));
            }
        }

        Ok(statement)
    }

    /// Fee loop: one definition fetch plus one insert per script key.
    ///
    /// Stops at the first failure; fees booked before it stay booked
    /// (the store isolates each fee insert from the outer transaction).
    async fn collect_fees(
        &self,
        tx: &mut dyn LedgerTx,
        debit: &AccountStatement,
        script: &Script,
    ) -> Result<u32, AppError> {
        // The store always assigns an id on insert
        let debit_id = debit.id.ok_or(AppError::Server)?;

        let mut booked = 0;
        for fee_key in &script.fee {
            let fee = self.fees.fetch_fee(fee_key).await?;

            // Derived, never supplied: same sign as the debit amount
            let amount = debit.amount * fee.value / Decimal::ONE_HUNDRED;

            let row = AccountStatementFee {
                id: None,
                fk_account_statement_id: debit_id,
                type_fee: fee.name,
                value_fee: fee.value,
                charged_at: None,
                currency: debit.currency.clone(),
                amount,
                tenant_id: debit.tenant_id.clone(),
            };

            tx.insert_fee(row).await?;
            booked += 1;
        }

        Ok(booked)
    }

    /// All committed debits for an external account id, newest first.
    pub async fn list_debits(&self, account_id: &str) -> Result<Vec<AccountStatement>, AppError> {
        let account = self.accounts.resolve(account_id).await?;
        self.store.list_debits(account.id, DEBIT_TYPE, None).await
    }

    /// Committed debits charged at or after `since`, newest first.
    pub async fn list_debits_since(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<AccountStatement>, AppError> {
        let account = self.accounts.resolve(account_id).await?;
        self.store
            .list_debits(account.id, DEBIT_TYPE, Some(since))
            .await
    }
}

/// Business rules checked before any I/O.
fn validate_debit(request: &DebitRequest) -> Result<(), AppError> {
    if request.type_charge != DEBIT_TYPE {
        return Err(AppError::TransactionInvalid);
    }
    if request.amount > Decimal::ZERO {
        return Err(AppError::InvalidAmount);
    }
    Ok(())
}
