// Telemetry data domain models
//
// Timestamps are zone-naive. Whoever builds a series is responsible for
// handing over instants already expressed in the device's local time; day
// bucketing and clock labels use them as-is.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Ping,
    Reboot,
    Other,
}

impl EventKind {
    /// Lenient parse of the raw event column ("G_PING", " reboot ", ...)
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "G_PING" | "PING" => EventKind::Ping,
            "REBOOT" => EventKind::Reboot,
            _ => EventKind::Other,
        }
    }

    /// Whether the event proves the device was reachable
    pub fn is_ping(self) -> bool {
        matches!(self, EventKind::Ping | EventKind::Reboot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub timestamp: NaiveDateTime,
    pub voltage: f64,
    pub event: EventKind,
}

impl TelemetrySample {
    pub fn new(timestamp: NaiveDateTime, voltage: f64, event: EventKind) -> Self {
        Self {
            timestamp,
            voltage,
            event,
        }
    }
}

/// Samples of one device over one query range, in ascending time order.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySeries {
    samples: Vec<TelemetrySample>,
}

impl TelemetrySeries {
    /// Builds a series from samples in any order.
    ///
    /// Ties on timestamp are broken by voltage and then event so that the
    /// resulting order never depends on the order the provider returned.
    pub fn new(mut samples: Vec<TelemetrySample>) -> Self {
        samples.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.voltage.total_cmp(&b.voltage))
                .then_with(|| a.event.cmp(&b.event))
        });
        Self { samples }
    }

    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn pings(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter().filter(|s| s.event.is_ping())
    }
}
