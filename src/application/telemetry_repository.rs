// Repository trait for telemetry and device metadata access
use crate::domain::date_range::DateRange;
use crate::domain::device::DeviceInfo;
use crate::domain::telemetry::TelemetrySample;
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// List metadata for every known device
    async fn list_devices(&self) -> anyhow::Result<Vec<DeviceInfo>>;

    /// Region/branch metadata for one device, if any was registered
    async fn get_device_info(&self, device_id: &str) -> anyhow::Result<Option<DeviceInfo>>;

    /// Samples of one device within the inclusive range, in no particular
    /// order. Rows with an unreadable time or voltage are already dropped.
    async fn fetch_samples(
        &self,
        device_id: &str,
        range: &DateRange,
    ) -> anyhow::Result<Vec<TelemetrySample>>;
}
