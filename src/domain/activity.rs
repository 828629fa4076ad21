// Activity summary domain model
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoltagePoint {
    pub time: NaiveDateTime,
    pub voltage: f64,
}

impl VoltagePoint {
    pub fn new(time: NaiveDateTime, voltage: f64) -> Self {
        Self { time, voltage }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerLabel {
    Start,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChargeMarker {
    pub time: NaiveDateTime,
    pub voltage: f64,
    pub label: MarkerLabel,
}

/// Ping volume per day overlaid with the voltage trend and charge markers.
///
/// Days without pings have no entry in `ping_counts_by_day`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub ping_counts_by_day: BTreeMap<NaiveDate, usize>,
    pub first_ping: Option<NaiveDateTime>,
    pub last_ping: Option<NaiveDateTime>,
    pub voltage_trend: Vec<VoltagePoint>,
    pub charge_markers: Vec<ChargeMarker>,
}

impl ActivitySummary {
    pub fn is_empty(&self) -> bool {
        self.ping_counts_by_day.is_empty()
            && self.voltage_trend.is_empty()
            && self.charge_markers.is_empty()
    }

    /// Whole days elapsed between the first and the last ping
    pub fn ping_span_days(&self) -> Option<i64> {
        let first = self.first_ping?;
        let last = self.last_ping?;
        Some(last.signed_duration_since(first).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_ping_span_days() {
        let mut summary = ActivitySummary::default();
        assert!(summary.is_empty());
        assert_eq!(summary.ping_span_days(), None);

        summary.ping_counts_by_day.insert(at(1, 30, 8).date(), 4);
        summary.ping_counts_by_day.insert(at(3, 1, 8).date(), 1);
        summary.first_ping = Some(at(1, 30, 8));
        summary.last_ping = Some(at(3, 1, 8));

        assert!(!summary.is_empty());
        assert_eq!(summary.ping_span_days(), Some(31));
    }

    #[test]
    fn test_ping_span_counts_elapsed_days_not_dates() {
        let summary = ActivitySummary {
            first_ping: Some(at(1, 1, 23)),
            last_ping: Some(at(3, 2, 1)),
            ..Default::default()
        };

        // 61 calendar dates apart but only 60 days and 2 hours elapsed
        assert_eq!(summary.ping_span_days(), Some(60));
    }
}
