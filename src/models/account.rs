//! Account shape returned by the remote account service.

use serde::{Deserialize, Serialize};

/// An account as resolved by the account service.
///
/// Read-only to this service: it is obtained per request, never stored.
/// Only the internal key and the external identifier matter here; any
/// additional fields the remote service returns are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Internal numeric account key, used as the ledger join key
    pub id: i32,

    /// External account identifier, as supplied by callers
    pub account_id: String,
}
