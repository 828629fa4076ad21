// Device metadata domain model
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    pub region: Option<String>,
    pub branch: Option<String>,
    pub sim_type: Option<String>,
}

impl DeviceInfo {
    pub fn new(id: &str) -> Self {
        Self {
            id: Self::normalize_id(id),
            region: None,
            branch: None,
            sim_type: None,
        }
    }

    pub fn normalize_id(id: &str) -> String {
        id.trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCount {
    pub region: String,
    pub count: usize,
}

/// Devices grouped by region. Devices without a region count towards the
/// total but not towards any region.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionDirectory {
    pub total_devices: usize,
    pub region_count: usize,
    pub regions: Vec<RegionCount>,
}

impl RegionDirectory {
    pub fn from_devices(devices: &[DeviceInfo]) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for region in devices.iter().filter_map(|d| d.region.as_deref()) {
            *counts.entry(region).or_default() += 1;
        }

        let regions: Vec<RegionCount> = counts
            .into_iter()
            .map(|(region, count)| RegionCount {
                region: region.to_string(),
                count,
            })
            .collect();

        Self {
            total_devices: devices.len(),
            region_count: regions.len(),
            regions,
        }
    }
}
