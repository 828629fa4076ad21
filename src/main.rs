// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;

use crate::application::device_service::DeviceService;
use crate::application::report_service::ReportService;
use crate::application::streaming_service::StreamingReportService;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::infrastructure::config::{load_influx_config, load_tracker_config};
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    device_report, health_check, list_devices, region_directory, stream_device_report,
};

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/devices", get(list_devices))
        .route("/regions", get(region_directory))
        .route("/devices/:id/report", get(device_report))
        .route("/devices/:id/report/stream", get(stream_device_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (RUST_LOG controls the filter)
    tracing_subscriber::fmt::init();

    // Load configuration
    let influx_config = load_influx_config().context("Failed to load InfluxDB configuration")?;
    let tracker_config = load_tracker_config().context("Failed to load tracker configuration")?;
    let params = tracker_config
        .detection
        .params()
        .context("Invalid charge detection settings")?;

    // Create repository (infrastructure layer)
    let repository: Arc<dyn TelemetryRepository> =
        Arc::new(InfluxRepository::new(influx_config.influx));

    // Create services (application layer)
    let state = Arc::new(AppState {
        device_service: DeviceService::new(repository.clone()),
        report_service: ReportService::new(repository.clone(), params),
        streaming_service: StreamingReportService::new(repository, params),
    });

    let addr: SocketAddr = tracker_config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", tracker_config.server.bind_addr))?;
    tracing::info!(
        "Starting battery-telemetry service on {} (rise threshold {}, window {})",
        addr,
        params.rise_threshold(),
        params.window()
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}
