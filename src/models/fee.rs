//! Fee script and fee definition shapes returned by the fee service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Script key fetched for every debit booking.
pub const DEBIT_SCRIPT: &str = "script.debit";

/// A named, ordered list of fee keys applicable to a transaction type.
///
/// The keys in `fee` are fetched one by one from the fee service to
/// obtain the matching [`Fee`] definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Ordered fee keys
    pub fee: Vec<String>,
}

/// One fee definition, keyed by a string inside [`Script::fee`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fee {
    pub name: String,

    /// Percentage applied to the debit amount
    pub value: Decimal,
}
