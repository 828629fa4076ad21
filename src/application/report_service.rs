// Report service - Use case for building a device charge report
use crate::application::charge_analysis::analyze;
use crate::application::cycle_detector::DetectorParams;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::date_range::DateRange;
use crate::domain::device::DeviceInfo;
use crate::domain::report::DeviceReport;
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReportService {
    repository: Arc<dyn TelemetryRepository>,
    params: DetectorParams,
}

impl ReportService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, params: DetectorParams) -> Self {
        Self { repository, params }
    }

    pub async fn device_report(&self, device_id: &str, range: DateRange) -> anyhow::Result<DeviceReport> {
        let device_id = DeviceInfo::normalize_id(device_id);

        let (info, samples) = tokio::join!(
            self.repository.get_device_info(&device_id),
            self.repository.fetch_samples(&device_id, &range),
        );

        // Metadata is decoration; a report without it is still useful
        let info = info.unwrap_or_else(|e| {
            tracing::warn!("Device metadata lookup failed for {}: {:#}", device_id, e);
            None
        });
        let samples = samples
            .with_context(|| format!("Failed to fetch samples for device {}", device_id))?;

        tracing::debug!(
            "Fetched {} samples for {} between {} and {}",
            samples.len(),
            device_id,
            range.from,
            range.to
        );

        let analysis = analyze(samples, &self.params);

        Ok(DeviceReport {
            device_id,
            info,
            range,
            ping_count: analysis.ping_count,
            cycles: analysis.cycles,
            summary: analysis.summary,
        })
    }
}
