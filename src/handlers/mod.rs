//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Delegates to the debit service
//! 3. Returns HTTP response (JSON, status code)

/// Debit booking and listing endpoints
pub mod debits;
/// Health and liveness probes
pub mod health;
