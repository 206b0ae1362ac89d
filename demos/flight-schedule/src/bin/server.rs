//! Flight Schedule Server
//!
//! Serves the flight schedule JSON API over in-memory stores.
//!
//! This binary:
//! - Loads configuration from the environment (and `.env`)
//! - Installs the Prometheus recorder and serves `/metrics`
//! - Seeds the example schedule
//! - Serves the API until Ctrl+C or SIGTERM
//!
//! # Usage
//!
//! ```bash
//! PORT=8080 cargo run --bin server
//! ```

use anyhow::Context;
use flight_schedule::{build_router, metrics::MetricsServer, seed, Config};
use flight_schedule_core::{environment::SystemClock, FlightSchedule};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::{signal, sync::Notify};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,flight_schedule=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Flight Schedule Server...");

    // Load configuration
    let config = Config::from_env();
    info!(
        address = %config.server_addr(),
        metrics_enabled = config.metrics.enabled,
        seed_example_data = config.seed_example_data,
        "Configuration loaded"
    );

    if config.metrics.enabled {
        let mut metrics = MetricsServer::new(config.metrics_addr());
        metrics.start().context("installing metrics recorder")?;
        tokio::spawn(async move {
            if let Err(e) = metrics.serve().await {
                warn!(error = %e, "Metrics server stopped");
            }
        });
    }

    let schedule = FlightSchedule::new(Arc::new(SystemClock));
    if config.seed_example_data {
        let summary = seed(&schedule)
            .await
            .context("seeding the example schedule")?;
        info!(
            airlines = summary.airlines,
            flights = summary.flights,
            "Example schedule ready"
        );
    }

    let app = build_router(&schedule);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on {}", addr);

    // Run server with graceful shutdown; in-flight requests get
    // SHUTDOWN_TIMEOUT seconds to finish
    let shutdown = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let shutdown = Arc::clone(&shutdown);
        async move {
            shutdown_signal().await;
            shutdown.notify_one();
        }
    });
    let grace = Duration::from_secs(config.server.shutdown_timeout);

    tokio::select! {
        result = server.into_future() => result.context("serving HTTP")?,
        () = async {
            shutdown.notified().await;
            tokio::time::sleep(grace).await;
        } => warn!(timeout_secs = grace.as_secs(), "Graceful shutdown timed out"),
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
