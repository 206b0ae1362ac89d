//! Flight schedule example application.
//!
//! Wires the in-memory stores to the HTTP API:
//!
//! - [`config`]: environment driven settings
//! - [`example_data`]: reference data and a sample schedule, created through
//!   the same store calls clients use
//! - [`metrics`]: Prometheus recorder and metric descriptions
//! - [`server`]: the Axum router

pub mod config;
pub mod example_data;
pub mod metrics;
pub mod server;

pub use config::Config;
pub use example_data::{SeedError, SeedSummary, seed};
pub use server::build_router;
