//! # CostClose API
//!
//! HTTP layer over the month-closing engine.
//!
//! This crate contains:
//! - axum handlers under `/costs` plus `/health`
//! - Application context (dependency injection)
//! - The `costclose` server binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the SQLite adapters into the core services
//! - Caller identity arrives in request headers set by the gateway

pub mod commands;
pub mod context;
pub mod routes;
pub mod utils;

pub use context::AppContext;
pub use routes::router;
