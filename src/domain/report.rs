// Device charge report domain model
use super::activity::ActivitySummary;
use super::charge::FormattedCycle;
use super::date_range::DateRange;
use super::device::DeviceInfo;

#[derive(Debug, Clone)]
pub struct DeviceReport {
    pub device_id: String,
    pub info: Option<DeviceInfo>,
    pub range: DateRange,
    pub ping_count: usize,
    pub cycles: Vec<FormattedCycle>,
    pub summary: ActivitySummary,
}

impl DeviceReport {
    pub fn charge_count(&self) -> usize {
        self.cycles.len()
    }

    pub fn long_offline_count(&self) -> usize {
        self.cycles.iter().filter(|c| c.is_long_offline).count()
    }
}
