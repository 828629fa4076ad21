// Aggregator - Daily ping volume, voltage trend and charge markers
use crate::domain::activity::{ActivitySummary, ChargeMarker, MarkerLabel, VoltagePoint};
use crate::domain::charge::FormattedCycle;
use crate::domain::telemetry::TelemetrySeries;
use std::collections::BTreeMap;

/// Builds the activity summary. A series without pings yields an empty
/// summary, telling the caller to leave the chart out.
pub fn build_summary(series: &TelemetrySeries, cycles: &[FormattedCycle]) -> ActivitySummary {
    if series.is_empty() {
        return ActivitySummary::default();
    }

    let mut ping_counts_by_day: BTreeMap<_, usize> = BTreeMap::new();
    for sample in series.pings() {
        *ping_counts_by_day.entry(sample.timestamp.date()).or_default() += 1;
    }

    if ping_counts_by_day.is_empty() {
        return ActivitySummary::default();
    }

    let voltage_trend = series
        .samples()
        .iter()
        .map(|s| VoltagePoint::new(s.timestamp, s.voltage))
        .collect();

    let charge_markers = cycles
        .iter()
        .flat_map(|c| {
            [
                ChargeMarker {
                    time: c.start_time,
                    voltage: c.start_voltage,
                    label: MarkerLabel::Start,
                },
                ChargeMarker {
                    time: c.end_time,
                    voltage: c.max_voltage,
                    label: MarkerLabel::Max,
                },
            ]
        })
        .collect();

    ActivitySummary {
        ping_counts_by_day,
        first_ping: series.pings().next().map(|s| s.timestamp),
        last_ping: series.pings().last().map(|s| s.timestamp),
        voltage_trend,
        charge_markers,
    }
}
