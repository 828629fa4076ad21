// Charge cycle domain models
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;

/// Candidates closer than this are treated as one physical charge.
pub const MERGE_GAP: TimeDelta = TimeDelta::minutes(60);

/// Cycles spanning at least this many days are flagged as offline periods.
pub const LONG_OFFLINE_DAYS: f64 = 2.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A single-window rise, before adjacent rises are merged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawChargeCandidate {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub start_voltage: f64,
    pub max_voltage: f64,
}

/// A consolidated charge cycle.
///
/// `max_voltage >= start_voltage` usually holds but is not guaranteed once
/// candidates with different baselines have been merged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeCycle {
    pub date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub start_voltage: f64,
    pub max_voltage: f64,
    pub duration: TimeDelta,
    pub is_long_offline: bool,
    /// Cycle span in fractional days
    pub offline_days: f64,
}

impl ChargeCycle {
    pub fn from_candidate(candidate: &RawChargeCandidate) -> Self {
        Self::spanning(
            candidate.start_time,
            candidate.end_time,
            candidate.start_voltage,
            candidate.max_voltage,
        )
    }

    fn spanning(
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        start_voltage: f64,
        max_voltage: f64,
    ) -> Self {
        let duration = end_time.signed_duration_since(start_time);
        Self {
            date: start_time.date(),
            start_time,
            end_time,
            start_voltage,
            max_voltage,
            duration,
            is_long_offline: is_anomalously_long_cycle(duration),
            offline_days: fractional_days(duration),
        }
    }

    /// Time between the end of this cycle and the start of `candidate`
    pub fn gap_to(&self, candidate: &RawChargeCandidate) -> TimeDelta {
        candidate.start_time.signed_duration_since(self.end_time)
    }

    /// Returns a new cycle covering both this cycle and `candidate`.
    pub fn absorb(&self, candidate: &RawChargeCandidate) -> Self {
        Self::spanning(
            self.start_time,
            self.end_time.max(candidate.end_time),
            self.start_voltage.min(candidate.start_voltage),
            self.max_voltage.max(candidate.max_voltage),
        )
    }

    #[cfg(test)]
    pub fn as_candidate(&self) -> RawChargeCandidate {
        RawChargeCandidate {
            start_time: self.start_time,
            end_time: self.end_time,
            start_voltage: self.start_voltage,
            max_voltage: self.max_voltage,
        }
    }
}

/// A charge cycle with its presentation fields filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedCycle {
    /// 1-based position in the report ("charge count")
    pub charge_number: usize,
    pub date: NaiveDate,
    pub date_label: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub start_time_label: String,
    pub end_time_label: String,
    pub start_voltage: f64,
    pub max_voltage: f64,
    pub duration_label: String,
    pub is_long_offline: bool,
    pub offline_days: f64,
    pub offline_duration_display: Option<String>,
}

/// Long charge spans are read as the device having been unreachable, not as
/// a literal multi-day charge. Kept as its own predicate so the heuristic can
/// be replaced without touching the merge.
pub fn is_anomalously_long_cycle(duration: TimeDelta) -> bool {
    fractional_days(duration) >= LONG_OFFLINE_DAYS
}

fn fractional_days(duration: TimeDelta) -> f64 {
    duration.num_milliseconds() as f64 / MILLIS_PER_DAY
}
