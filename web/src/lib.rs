//! Axum integration for the flight schedule stores.
//!
//! The stores in `flight-schedule-core` know nothing about HTTP. This crate
//! is the thin shell around them.
//!
//! # Request Flow
//!
//! 1. **Correlation layer** tags the request and opens a tracing span
//! 2. **Extract** path ids and JSON bodies
//! 3. **Call** the store (`create`, `update`, `get`, ...)
//! 4. **Map** `StoreError` to an [`AppError`] (400, 404, 409)
//! 5. **Return** the stored record as JSON
//!
//! # Example
//!
//! ```ignore
//! use flight_schedule_web::{crud_router, correlation_id_layer, Access};
//! use axum::Router;
//!
//! let app = Router::new()
//!     .nest("/api/Airline", crud_router(schedule.airlines.clone(), Access::ReadWrite))
//!     .nest("/api/Gate", crud_router(schedule.gates.clone(), Access::ReadOnly))
//!     .layer(correlation_id_layer());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::CorrelationId;
pub use handlers::{crud_router, health_check, Access};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
