//! Debit HTTP handlers.
//!
//! This module implements the debit API endpoints:
//! - POST /add - Book a debit against an account
//! - GET /list/{id} - List debits for an external account id
//! - GET /listPerDate?account=&date_start= - Same, filtered by date

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::AppState;
use crate::error::AppError;
use crate::models::statement::{AccountStatement, DebitRequest, ListPerDateQuery};

/// Book a debit.
///
/// # Request Body
///
/// ```json
/// {
///   "account_id": "ACC-001",
///   "type_charge": "DEBIT",
///   "currency": "USD",
///   "amount": -50.0,
///   "tenant_id": "TENANT-1"
/// }
/// ```
///
/// # Response (200)
///
/// The enriched statement, including the assigned `id`, `charged_at`,
/// `transaction_id` and - when the fee sub-flow degraded - `obs`.
///
/// # Errors
///
/// - 400 malformed body
/// - 404 account not found
/// - 409 invalid transaction type or invalid amount
/// - 500 otherwise
pub async fn add_debit(
    State(state): State<AppState>,
    body: Result<Json<DebitRequest>, JsonRejection>,
) -> Result<Json<AccountStatement>, AppError> {
    // Body decode failures are our 400, not axum's default rejection
    let Json(request) = body.map_err(|rejection| AppError::Unmarshal(rejection.to_string()))?;

    let statement = state.debits.add_debit(request).await?;
    Ok(Json(statement))
}

/// List all debits for an external account id, newest first.
pub async fn list_debits(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<Vec<AccountStatement>>, AppError> {
    let statements = state.debits.list_debits(&account_id).await?;
    Ok(Json(statements))
}

/// List debits charged at or after a given date, newest first.
///
/// `date_start` is date-only (`YYYY-MM-DD`); it is widened to midnight
/// UTC before the comparison.
pub async fn list_debits_per_date(
    State(state): State<AppState>,
    Query(query): Query<ListPerDateQuery>,
) -> Result<Json<Vec<AccountStatement>>, AppError> {
    let since = parse_date_start(&query.date_start)?;
    let statements = state.debits.list_debits_since(&query.account, since).await?;
    Ok(Json(statements))
}

/// Widen a `YYYY-MM-DD` date to a midnight UTC timestamp.
fn parse_date_start(date_start: &str) -> Result<DateTime<Utc>, AppError> {
    let date = NaiveDate::parse_from_str(date_start, "%Y-%m-%d")
        .map_err(|err| AppError::Unmarshal(format!("invalid date_start '{date_start}': {err}")))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}
