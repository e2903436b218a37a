//! Data models representing database entities and downstream payloads.
//!
//! This module contains all data structures that map to database tables
//! or to the JSON shapes exchanged with the remote services.

/// Account shape returned by the account service
pub mod account;
/// Fee script and fee definition shapes returned by the fee service
pub mod fee;
/// Account statement (debit) and statement fee entities
pub mod statement;
