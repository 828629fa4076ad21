// Cycle detector - Windowed voltage-rise scan over a sorted series
use crate::domain::charge::RawChargeCandidate;
use crate::domain::error::TrackerError;
use crate::domain::telemetry::{TelemetrySample, TelemetrySeries};

pub const DEFAULT_RISE_THRESHOLD: f64 = 0.15;
pub const DEFAULT_WINDOW: usize = 3;

/// Relative slack absorbing binary rounding, so that a decimal rise equal to
/// the threshold (3.00 -> 3.15 at 0.15) still counts.
const RISE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorParams {
    rise_threshold: f64,
    window: usize,
}

impl DetectorParams {
    pub fn new(rise_threshold: f64, window: usize) -> Result<Self, TrackerError> {
        if !rise_threshold.is_finite() || rise_threshold <= 0.0 {
            return Err(TrackerError::InvalidThreshold(rise_threshold));
        }
        if window == 0 {
            return Err(TrackerError::ZeroWindow);
        }
        Ok(Self {
            rise_threshold,
            window,
        })
    }

    pub fn rise_threshold(&self) -> f64 {
        self.rise_threshold
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            rise_threshold: DEFAULT_RISE_THRESHOLD,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Lazily yields one candidate per detected rise, in start-time order.
///
/// At cursor `i` the voltage is compared with the one `window` samples
/// later. On a rise the candidate ends at the first maximum inside
/// `[i, i + window]` and the scan resumes from there, so one physical charge
/// is not reported twice by overlapping windows.
pub struct CycleDetector<'a> {
    samples: &'a [TelemetrySample],
    params: DetectorParams,
    cursor: usize,
}

impl<'a> CycleDetector<'a> {
    pub fn new(series: &'a TelemetrySeries, params: DetectorParams) -> Self {
        Self {
            samples: series.samples(),
            params,
            cursor: 0,
        }
    }

    fn rises(&self, start: &TelemetrySample, end: &TelemetrySample) -> bool {
        if start.voltage.is_nan() || end.voltage.is_nan() {
            return false;
        }
        let threshold = self.params.rise_threshold;
        end.voltage - start.voltage >= threshold - threshold * RISE_TOLERANCE
    }

    fn first_max_index(&self, from: usize, to: usize) -> usize {
        (from..=to).fold(from, |best, j| {
            if self.samples[j].voltage > self.samples[best].voltage {
                j
            } else {
                best
            }
        })
    }
}

impl Iterator for CycleDetector<'_> {
    type Item = RawChargeCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        let window = self.params.window;

        while self.cursor + window < self.samples.len() {
            let i = self.cursor;
            let start = self.samples[i];

            if !self.rises(&start, &self.samples[i + window]) {
                self.cursor += 1;
                continue;
            }

            let max_index = self.first_max_index(i, i + window);
            let peak = self.samples[max_index];
            self.cursor = max_index.max(i + 1);

            return Some(RawChargeCandidate {
                start_time: start.timestamp,
                end_time: peak.timestamp,
                start_voltage: start.voltage,
                max_voltage: peak.voltage,
            });
        }

        None
    }
}
