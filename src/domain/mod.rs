// Domain layer - Pure models and invariants, no I/O
pub mod activity;
pub mod charge;
pub mod date_range;
pub mod device;
pub mod error;
pub mod report;
pub mod telemetry;
