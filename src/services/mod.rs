//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database transactions, validation, and the orchestration
//! of downstream calls.

pub mod debit_service;
