// Charge analysis - Sort, detect, merge, format and aggregate in one pass
use crate::application::aggregator::build_summary;
use crate::application::cycle_detector::{CycleDetector, DetectorParams};
use crate::application::cycle_formatter::format_cycles;
use crate::application::cycle_merger::merge_candidates;
use crate::domain::activity::ActivitySummary;
use crate::domain::charge::FormattedCycle;
use crate::domain::telemetry::{TelemetrySample, TelemetrySeries};

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeAnalysis {
    pub ping_count: usize,
    pub cycles: Vec<FormattedCycle>,
    pub summary: ActivitySummary,
}

/// Runs the whole charge pipeline over one device's samples.
///
/// Samples may arrive in any order. Empty or too-short input is not an
/// error; it simply produces no cycles and an empty summary.
pub fn analyze(samples: Vec<TelemetrySample>, params: &DetectorParams) -> ChargeAnalysis {
    let series = TelemetrySeries::new(samples);

    let cycles = merge_candidates(CycleDetector::new(&series, *params));
    let cycles = format_cycles(&cycles);
    let summary = build_summary(&series, &cycles);

    tracing::debug!(
        "Analyzed {} samples: {} charge cycles, {} days with pings",
        series.len(),
        cycles.len(),
        summary.ping_counts_by_day.len()
    );

    ChargeAnalysis {
        ping_count: series.pings().count(),
        cycles,
        summary,
    }
}
