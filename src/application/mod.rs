// Application layer - Charge detection core and use cases
pub mod aggregator;
pub mod charge_analysis;
pub mod cycle_detector;
pub mod cycle_formatter;
pub mod cycle_merger;
pub mod device_service;
pub mod report_service;
pub mod streaming_service;
pub mod telemetry_repository;
