// Inclusive query date range
use super::error::TrackerError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, TrackerError> {
        if from > to {
            return Err(TrackerError::InvertedRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn parse(from: &str, to: &str) -> Result<Self, TrackerError> {
        Self::new(parse_date(from)?, parse_date(to)?)
    }

    /// First instant of the range (midnight of `from`)
    pub fn start(&self) -> NaiveDateTime {
        self.from.and_time(NaiveTime::MIN)
    }

    /// Last whole second of the range (23:59:59 of `to`)
    pub fn end(&self) -> NaiveDateTime {
        // 23:59:59 is always a valid time
        self.to
            .and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| self.to.and_time(NaiveTime::MIN))
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, TrackerError> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| TrackerError::InvalidDate(raw.to_string()))
}
