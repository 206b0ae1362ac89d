//! Prometheus metrics for the flight schedule server.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `flight_schedule_store_operations_total{kind, operation, outcome}` - store calls by result
//! - `flight_schedule_http_requests_total{method, status}` - API requests by status
//!
//! ## Gauges
//! - `flight_schedule_records{kind}` - records currently held per store

use axum::{Router, routing::get};
use ::metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
    /// Failed to bind HTTP server
    #[error("Failed to bind metrics server: {0}")]
    Bind(#[from] std::io::Error),
}

/// Register all metric descriptions.
///
/// Call once at start-up, before any metric is recorded.
pub fn register_metrics() {
    describe_counter!(
        "flight_schedule_store_operations_total",
        "Store operations by record kind, operation and outcome (ok, invalid, not_found, conflict)"
    );
    describe_gauge!(
        "flight_schedule_records",
        "Records currently held in each store"
    );
    describe_counter!(
        "flight_schedule_http_requests_total",
        "HTTP requests by method and response status"
    );

    tracing::debug!("Metrics registered");
}

/// Prometheus metrics endpoint.
///
/// Installs the global recorder and serves the rendered metrics on its own
/// listener, apart from the API.
pub struct MetricsServer {
    addr: String,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a metrics server for `addr` (e.g. `0.0.0.0:9090`).
    #[must_use]
    pub const fn new(addr: String) -> Self {
        Self { addr, handle: None }
    }

    /// Install the Prometheus recorder and register metric descriptions.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Install`] if a different recorder is already
    /// installed.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| MetricsError::Install(e.to_string()))?;
        register_metrics();
        self.handle = Some(handle);
        tracing::info!(addr = %self.addr, "Metrics recorder installed");
        Ok(())
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if the server hasn't been started.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }

    /// Serve `GET /metrics` until the process exits.
    ///
    /// Does nothing when [`start`](Self::start) was not called.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Bind`] if the listener cannot bind or fails.
    pub async fn serve(self) -> Result<(), MetricsError> {
        let Some(handle) = self.handle else {
            return Ok(());
        };

        let app = Router::new().route("/metrics", get(move || async move { handle.render() }));
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        tracing::info!(
            addr = %self.addr,
            "Metrics server started - available at http://{}/metrics",
            self.addr
        );
        axum::serve(listener, app).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_before_start_is_none() {
        let server = MetricsServer::new("127.0.0.1:0".to_string());
        assert!(server.render().is_none());
    }
}
