// HTTP request handlers
use crate::domain::date_range::DateRange;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::infrastructure::report_mapper::report_to_view;
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

/// Dates as DD/MM/YYYY or YYYY-MM-DD, both inclusive
#[derive(Deserialize)]
pub struct RangeQuery {
    pub from: String,
    pub to: String,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange, ApiError> {
        Ok(DateRange::parse(&self.from, &self.to)?)
    }
}

fn into_response(result: Result<Response, axum::http::StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all devices with their metadata
pub async fn list_devices(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let devices = state.device_service.list_devices().await?;
    Ok(into_response(json_response(&devices, accepts_brotli(&headers)).await))
}

/// Device counts per region
pub async fn region_directory(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let directory = state.device_service.region_directory().await?;
    Ok(into_response(json_response(&directory, accepts_brotli(&headers)).await))
}

/// Charge report for one device over a date range
pub async fn device_report(
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let range = query.range()?;
    let report = state.report_service.device_report(&id, range).await?;

    tracing::info!(
        "Report for {}: {} pings, {} charges, {} long offline",
        report.device_id,
        report.ping_count,
        report.charge_count(),
        report.long_offline_count()
    );

    let view = report_to_view(&report);
    Ok(into_response(json_response(&view, accepts_brotli(&headers)).await))
}

/// Stream the report for one device (progressive loading)
pub async fn stream_device_report(
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let range = query.range()?;
    let rx = state.streaming_service.stream_report(&id, range).await;
    Ok(stream_from_receiver(rx, accepts_brotli(&headers))
        .await
        .into_response())
}
