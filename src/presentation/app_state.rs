// Application state for HTTP handlers
use crate::application::device_service::DeviceService;
use crate::application::report_service::ReportService;
use crate::application::streaming_service::StreamingReportService;

#[derive(Clone)]
pub struct AppState {
    pub device_service: DeviceService,
    pub report_service: ReportService,
    pub streaming_service: StreamingReportService,
}
