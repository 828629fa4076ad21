// Device service - Use cases for device metadata
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::device::{DeviceInfo, RegionDirectory};
use std::sync::Arc;

#[derive(Clone)]
pub struct DeviceService {
    repository: Arc<dyn TelemetryRepository>,
}

impl DeviceService {
    pub fn new(repository: Arc<dyn TelemetryRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_devices(&self) -> anyhow::Result<Vec<DeviceInfo>> {
        self.repository.list_devices().await
    }

    pub async fn region_directory(&self) -> anyhow::Result<RegionDirectory> {
        let devices = self.repository.list_devices().await?;
        Ok(RegionDirectory::from_devices(&devices))
    }
}
