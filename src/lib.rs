//! Debit booking service.
//!
//! Books a monetary debit against an account: validates the request,
//! resolves the account through a remote service, persists a ledger
//! entry inside a local transaction, notifies a downstream balance
//! service, then - best-effort, behind a circuit breaker - fetches a fee
//! schedule and books fee line items against the same debit.

pub mod breaker;
pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;

use crate::db::DbPool;
use crate::services::debit_service::DebitService;

/// Shared state handed to every handler via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Pool for the health check's connectivity probe
    pub pool: DbPool,

    /// The debit orchestrator with all collaborators wired in
    pub debits: Arc<DebitService>,
}
