// Streaming report service - Progressive loading of a device report
use crate::application::charge_analysis::analyze;
use crate::application::cycle_detector::DetectorParams;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::activity::ActivitySummary;
use crate::domain::charge::FormattedCycle;
use crate::domain::date_range::DateRange;
use crate::domain::device::DeviceInfo;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// One step of a progressively delivered report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// Sent first, before any query has finished
    Skeleton { device_id: String, range: DateRange },
    Metadata { info: Option<DeviceInfo> },
    Cycles {
        ping_count: usize,
        cycles: Vec<FormattedCycle>,
    },
    Summary { summary: ActivitySummary },
    Failed { message: String },
    Complete { elapsed_ms: i64 },
}

#[derive(Clone)]
pub struct StreamingReportService {
    repository: Arc<dyn TelemetryRepository>,
    params: DetectorParams,
}

impl StreamingReportService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, params: DetectorParams) -> Self {
        Self { repository, params }
    }

    pub async fn stream_report(&self, device_id: &str, range: DateRange) -> mpsc::Receiver<ReportEvent> {
        let (tx, rx) = mpsc::channel(16);
        let start_time = Instant::now();
        let device_id = DeviceInfo::normalize_id(device_id);

        // 1. Skeleton immediately
        let skeleton = ReportEvent::Skeleton {
            device_id: device_id.clone(),
            range,
        };
        let _ = tx.send(skeleton).await;

        // 2. Metadata lookup
        let metadata_task = {
            let tx = tx.clone();
            let repo = self.repository.clone();
            let device_id = device_id.clone();

            tokio::spawn(async move {
                let info = repo.get_device_info(&device_id).await.unwrap_or_else(|e| {
                    tracing::warn!("Device metadata lookup failed for {}: {:#}", device_id, e);
                    None
                });
                let _ = tx.send(ReportEvent::Metadata { info }).await;
            })
        };

        // 3. Samples and charge analysis, concurrently with the lookup
        let analysis_task = {
            let tx = tx.clone();
            let repo = self.repository.clone();
            let params = self.params;

            tokio::spawn(async move {
                match repo.fetch_samples(&device_id, &range).await {
                    Ok(samples) => {
                        let analysis = analyze(samples, &params);
                        let cycles = ReportEvent::Cycles {
                            ping_count: analysis.ping_count,
                            cycles: analysis.cycles,
                        };
                        if tx.send(cycles).await.is_err() {
                            return;
                        }
                        let _ = tx
                            .send(ReportEvent::Summary {
                                summary: analysis.summary,
                            })
                            .await;
                    }
                    Err(e) => {
                        tracing::error!("Failed to fetch samples for {}: {:#}", device_id, e);
                        let _ = tx
                            .send(ReportEvent::Failed {
                                message: format!("Failed to fetch samples: {}", e),
                            })
                            .await;
                    }
                }
            })
        };

        // 4. Completion once both tasks are done
        tokio::spawn(async move {
            for (name, task) in [("metadata", metadata_task), ("analysis", analysis_task)] {
                if let Err(e) = task.await {
                    tracing::error!("Report {} task aborted: {}", name, e);
                }
            }

            let elapsed_ms = start_time.elapsed().as_millis() as i64;
            let _ = tx.send(ReportEvent::Complete { elapsed_ms }).await;
        });

        rx
    }
}
