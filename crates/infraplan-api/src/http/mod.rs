//! HTTP/REST API layer for infraplan.
//!
//! Axum-based API driving conversations in programmatic mode: one request
//! is one state-machine step. CORS is open to any origin.

pub mod error;
pub mod handlers;
pub mod router;
