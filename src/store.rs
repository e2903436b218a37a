//! Ledger store - transactional persistence for debits and fees.
//!
//! The store is split in two traits so the orchestrator can be tested
//! against an in-memory double:
//! - [`LedgerStore`]: opens transactions and serves the read path
//! - [`LedgerTx`]: one open transaction; all writes go through it
//!
//! # Transaction Guarantees
//!
//! Writes take place on the caller-supplied transaction and become
//! visible only at commit. Dropping an uncommitted [`PgLedgerTx`] rolls
//! it back (sqlx drop semantics), so a request aborted mid-flight can
//! never leave a partial debit behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Acquire, Postgres, Transaction};

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::statement::{AccountStatement, AccountStatementFee};

/// Contract for opening transactions and reading committed debits.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open one transaction. The caller must finish it with
    /// [`LedgerTx::commit`] or [`LedgerTx::rollback`] on every exit path.
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, AppError>;

    /// Committed debit rows for an internal account key, ordered by
    /// `charged_at` descending. `since` narrows to `charged_at >= since`.
    /// Unbounded result set; no pagination.
    async fn list_debits(
        &self,
        account_key: i32,
        type_charge: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AccountStatement>, AppError>;
}

/// One open ledger transaction.
#[async_trait]
pub trait LedgerTx: Send {
    /// Insert a debit row. The store assigns `id` and `charged_at` and
    /// returns the enriched statement.
    async fn insert_debit(
        &mut self,
        statement: AccountStatement,
    ) -> Result<AccountStatement, AppError>;

    /// Insert a fee row referencing an already-inserted debit.
    ///
    /// A failed fee insert must not poison the surrounding transaction:
    /// the debit and fees booked before the failure still have to commit.
    async fn insert_fee(
        &mut self,
        fee: AccountStatementFee,
    ) -> Result<AccountStatementFee, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}

/// PostgreSQL-backed ledger store.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: DbPool,
}

impl PgLedgerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLedgerTx { tx }))
    }

    async fn list_debits(
        &self,
        account_key: i32,
        type_charge: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AccountStatement>, AppError> {
        // Reads acquire their own pooled connection; no transaction needed
        let rows = match since {
            Some(since) => {
                sqlx::query_as::<_, AccountStatement>(
                    r#"
                    SELECT id, fk_account_id, type_charge, charged_at,
                           currency, amount, tenant_id, transaction_id
                    FROM account_statement
                    WHERE fk_account_id = $1
                      AND type_charge = $2
                      AND charged_at >= $3
                    ORDER BY charged_at DESC, id DESC
                    "#,
                )
                .bind(account_key)
                .bind(type_charge)
                .bind(since)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AccountStatement>(
                    r#"
                    SELECT id, fk_account_id, type_charge, charged_at,
                           currency, amount, tenant_id, transaction_id
                    FROM account_statement
                    WHERE fk_account_id = $1
                      AND type_charge = $2
                    ORDER BY charged_at DESC, id DESC
                    "#,
                )
                .bind(account_key)
                .bind(type_charge)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }
}

/// One open PostgreSQL transaction.
pub struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn insert_debit(
        &mut self,
        mut statement: AccountStatement,
    ) -> Result<AccountStatement, AppError> {
        let charged_at = Utc::now();

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO account_statement (
                fk_account_id,
                type_charge,
                charged_at,
                currency,
                amount,
                tenant_id,
                transaction_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(statement.fk_account_id)
        .bind(&statement.type_charge)
        .bind(charged_at)
        .bind(&statement.currency)
        .bind(statement.amount)
        .bind(&statement.tenant_id)
        .bind(statement.transaction_id)
        .fetch_one(&mut *self.tx)
        .await?;

        statement.id = Some(id);
        statement.charged_at = Some(charged_at);
        Ok(statement)
    }

    async fn insert_fee(
        &mut self,
        mut fee: AccountStatementFee,
    ) -> Result<AccountStatementFee, AppError> {
        let charged_at = Utc::now();

        // Savepoint per fee insert: a failed statement aborts a Postgres
        // transaction, which would turn a soft fee failure into a lost
        // debit at COMMIT. Rolling back to the savepoint keeps the outer
        // transaction healthy.
        let mut savepoint = self.tx.begin().await?;

        let inserted: Result<i32, sqlx::Error> = sqlx::query_scalar(
            r#"
            INSERT INTO account_statement_fee (
                fk_account_statement_id,
                charged_at,
                type_fee,
                value_fee,
                currency,
                amount,
                tenant_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(fee.fk_account_statement_id)
        .bind(charged_at)
        .bind(&fee.type_fee)
        .bind(fee.value_fee)
        .bind(&fee.currency)
        .bind(fee.amount)
        .bind(&fee.tenant_id)
        .fetch_one(&mut *savepoint)
        .await;

        match inserted {
            Ok(id) => {
                savepoint.commit().await?;
                fee.id = Some(id);
                fee.charged_at = Some(charged_at);
                Ok(fee)
            }
            Err(err) => {
                savepoint.rollback().await?;
                Err(err.into())
            }
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
