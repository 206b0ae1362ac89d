//! HTTP server components for the flight schedule.

pub mod routes;

pub use routes::build_router;
