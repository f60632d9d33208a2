//! HTTP API surface
//!
//! Axum routes, request/response types and handlers. Handlers validate
//! inputs and delegate to the wallet manager; queued operations return the
//! item's description and queue position, not the ledger outcome.

pub mod handlers;
pub mod server;
pub mod types;
