//! Router configuration for the flight schedule.
//!
//! Builds the complete Axum router with all endpoints.

use axum::{routing::get, Router};
use flight_schedule_core::FlightSchedule;
use flight_schedule_web::{correlation_id_layer, crud_router, health_check, Access};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

/// Build the complete Axum router.
///
/// - `GET /health`
/// - `/api/Airline` and `/api/Flight`: full CRUD
/// - `/api/Gate` and `/api/SortDestination`: read-only reference data
///
/// Every request passes the correlation-id layer first, then request
/// tracing, CORS and gzip compression.
pub fn build_router(schedule: &FlightSchedule) -> Router {
    // API routes
    let api_routes = Router::new()
        .nest(
            "/Airline",
            crud_router(schedule.airlines.clone(), Access::ReadWrite),
        )
        .nest(
            "/Flight",
            crud_router(schedule.flights.clone(), Access::ReadWrite),
        )
        .nest("/Gate", crud_router(schedule.gates.clone(), Access::ReadOnly))
        .nest(
            "/SortDestination",
            crud_router(schedule.sort_destinations.clone(), Access::ReadOnly),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
}
