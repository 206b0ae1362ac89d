//! HTTP request handlers.
//!
//! - [`health`]: liveness endpoint
//! - [`crud`]: the generic record endpoints mounted once per store

pub mod crud;
pub mod health;

// Re-export common handler utilities
pub use crud::{crud_router, Access};
pub use health::health_check;
