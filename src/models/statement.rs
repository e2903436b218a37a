//! Account statement data models and API request/query types.
//!
//! This module defines:
//! - `AccountStatement`: Database entity representing one booked debit
//! - `AccountStatementFee`: Fee line item referencing a booked debit
//! - `DebitRequest`: Request body accepted by POST /add
//! - `ListPerDateQuery`: Query parameters for GET /listPerDate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transaction type tag accepted by the debit flow.
pub const DEBIT_TYPE: &str = "DEBIT";

/// Represents a debit entry from the `account_statement` table.
///
/// # Lifecycle
///
/// 1. Constructed from an inbound [`DebitRequest`]
/// 2. Enriched with `fk_account_id` once the account service resolves
///    the external identifier
/// 3. Assigned `id` and `charged_at` by the store on insert
/// 4. Optionally annotated with `obs` when the fee sub-flow degrades
///
/// Read-only afterwards; list endpoints return it verbatim.
///
/// # Amounts
///
/// Amounts are exact decimals (`NUMERIC` in the database). A debit is
/// always non-positive; the sign convention carries over to fee rows.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AccountStatement {
    /// Store-assigned identity, present once the row is inserted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    /// Internal account key resolved from `account_id`
    pub fk_account_id: i32,

    /// External account identifier; carried on the wire, not persisted
    /// as a column (the join key is `fk_account_id`)
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Transaction type tag, `"DEBIT"` for this flow
    pub type_charge: String,

    /// Charge timestamp, assigned by the store at insert time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charged_at: Option<DateTime<Utc>>,

    /// Currency code (ISO 4217)
    pub currency: String,

    /// Signed amount; must be <= 0 for a debit
    pub amount: Decimal,

    pub tenant_id: String,

    /// Correlation UUID assigned per booking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<Uuid>,

    /// Degradation note set when the fee sub-flow could not complete.
    /// Never persisted; only present on the response.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs: Option<String>,
}

/// Fee line item from the `account_statement_fee` table.
///
/// A debit owns zero or more fee rows. `amount` is always derived
/// (`debit.amount * value_fee / 100`), never supplied by a caller.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AccountStatementFee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    /// Owning debit row
    pub fk_account_statement_id: i32,

    /// Fee name as defined by the fee service
    pub type_fee: String,

    /// Percentage applied to the debit amount
    pub value_fee: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub charged_at: Option<DateTime<Utc>>,

    pub currency: String,

    /// Computed fee amount, same sign as the debit amount
    pub amount: Decimal,

    pub tenant_id: String,
}

/// Request body for booking a debit.
///
/// # JSON Example
///
/// ```json
/// {
///   "account_id": "ACC-001",
///   "type_charge": "DEBIT",
///   "currency": "USD",
///   "amount": -50.00,
///   "tenant_id": "TENANT-1"
/// }
/// ```
///
/// # Validation
///
/// - `type_charge` must be exactly `"DEBIT"`
/// - `amount` must be <= 0 (a debit removes money)
#[derive(Debug, Clone, Deserialize)]
pub struct DebitRequest {
    /// External account identifier to resolve and charge
    pub account_id: String,

    /// Transaction type tag
    pub type_charge: String,

    /// Currency code
    pub currency: String,

    /// Signed amount, non-positive for a debit
    pub amount: Decimal,

    pub tenant_id: String,
}

/// Query string for GET /listPerDate.
#[derive(Debug, Deserialize)]
pub struct ListPerDateQuery {
    /// External account identifier
    pub account: String,

    /// Minimum charge date, date-only (`YYYY-MM-DD`)
    pub date_start: String,
}
