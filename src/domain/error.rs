// Domain error types
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackerError {
    #[error("invalid date '{0}': expected DD/MM/YYYY or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid date range: {from} is after {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },

    #[error("detection window must span at least one sample")]
    ZeroWindow,

    #[error("rise threshold must be a positive finite number, got {0}")]
    InvalidThreshold(f64),
}
