// Mapper to convert domain reports into the JSON wire views
use crate::application::streaming_service::ReportEvent;
use crate::domain::activity::{ActivitySummary, MarkerLabel};
use crate::domain::charge::FormattedCycle;
use crate::domain::date_range::DateRange;
use crate::domain::device::DeviceInfo;
use crate::domain::report::DeviceReport;
use serde::Serialize;

const CHART_TITLE: &str = "Activity Summary";
const VOLTAGE_AXIS_RANGE: [f64; 2] = [2.8, 4.4];
/// Ping spans longer than this are labelled by month
const MONTHLY_AXIS_DAYS: i64 = 60;

const DAY_FORMAT: &str = "%Y-%m-%d";
const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const HOVER_FORMAT: &str = "%d-%m-%Y %I:%M %p";
const QUERY_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportView {
    pub device: String,
    pub region: Option<String>,
    pub branch: Option<String>,
    pub sim_type: Option<String>,
    pub from_date: String,
    pub to_date: String,
    pub pings: usize,
    pub charges: usize,
    pub long_offline_count: usize,
    pub charge_details: Vec<CycleRow>,
    pub chart: Option<ChartView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CycleRow {
    pub charge_count: usize,
    pub date: String,
    pub start_voltage: String,
    pub max_voltage: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
    pub status: String,
    pub is_long_offline: bool,
    pub offline_days: f64,
    pub offline_duration: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartView {
    pub title: String,
    pub traces: Vec<TraceView>,
    pub x_axis: AxisView,
    pub y_axis: AxisView,
    pub y2_axis: AxisView,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Bar,
    Line,
    Markers,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TraceView {
    pub name: String,
    pub kind: TraceKind,
    pub y_axis: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AxisView {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_format: Option<String>,
    pub tick_angle: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl AxisView {
    fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            tick_format: None,
            tick_angle: 0,
            range: None,
        }
    }
}

/// Messages of the progressive report stream
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessageView {
    Skeleton {
        device: String,
        from_date: String,
        to_date: String,
    },
    Metadata {
        region: Option<String>,
        branch: Option<String>,
        sim_type: Option<String>,
    },
    Cycles {
        pings: usize,
        charges: usize,
        long_offline_count: usize,
        charge_details: Vec<CycleRow>,
    },
    Summary {
        chart: Option<ChartView>,
    },
    Failed {
        message: String,
    },
    Complete {
        elapsed_ms: i64,
    },
}

pub fn report_to_view(report: &DeviceReport) -> ReportView {
    let (region, branch, sim_type) = metadata_fields(report.info.as_ref());
    let (from_date, to_date) = range_fields(&report.range);

    ReportView {
        device: report.device_id.clone(),
        region,
        branch,
        sim_type,
        from_date,
        to_date,
        pings: report.ping_count,
        charges: report.charge_count(),
        long_offline_count: report.long_offline_count(),
        charge_details: report.cycles.iter().map(cycle_to_row).collect(),
        chart: chart_to_view(&report.summary),
    }
}

pub fn event_to_view(event: ReportEvent) -> StreamMessageView {
    match event {
        ReportEvent::Skeleton { device_id, range } => {
            let (from_date, to_date) = range_fields(&range);
            StreamMessageView::Skeleton {
                device: device_id,
                from_date,
                to_date,
            }
        }
        ReportEvent::Metadata { info } => {
            let (region, branch, sim_type) = metadata_fields(info.as_ref());
            StreamMessageView::Metadata {
                region,
                branch,
                sim_type,
            }
        }
        ReportEvent::Cycles { ping_count, cycles } => StreamMessageView::Cycles {
            pings: ping_count,
            charges: cycles.len(),
            long_offline_count: cycles.iter().filter(|c| c.is_long_offline).count(),
            charge_details: cycles.iter().map(cycle_to_row).collect(),
        },
        ReportEvent::Summary { summary } => StreamMessageView::Summary {
            chart: chart_to_view(&summary),
        },
        ReportEvent::Failed { message } => StreamMessageView::Failed { message },
        ReportEvent::Complete { elapsed_ms } => StreamMessageView::Complete { elapsed_ms },
    }
}

fn metadata_fields(info: Option<&DeviceInfo>) -> (Option<String>, Option<String>, Option<String>) {
    match info {
        Some(info) => (info.region.clone(), info.branch.clone(), info.sim_type.clone()),
        None => (None, None, None),
    }
}

fn range_fields(range: &DateRange) -> (String, String) {
    (
        range.from.format(QUERY_DATE_FORMAT).to_string(),
        range.to.format(QUERY_DATE_FORMAT).to_string(),
    )
}

fn cycle_to_row(cycle: &FormattedCycle) -> CycleRow {
    let status = match &cycle.offline_duration_display {
        Some(display) => format!("Offline for {}", display),
        None => "Normal".to_string(),
    };

    CycleRow {
        charge_count: cycle.charge_number,
        date: cycle.date_label.clone(),
        start_voltage: format!("{:.2}V", cycle.start_voltage),
        max_voltage: format!("{:.2}V", cycle.max_voltage),
        start_time: cycle.start_time_label.clone(),
        end_time: cycle.end_time_label.clone(),
        duration: cycle.duration_label.clone(),
        status,
        is_long_offline: cycle.is_long_offline,
        offline_days: cycle.offline_days,
        offline_duration: cycle.offline_duration_display.clone(),
    }
}

/// Dual-axis chart: ping bars on the left axis, voltage line and charge
/// markers on the right. Empty traces are left out; an empty summary has
/// no chart at all.
pub fn chart_to_view(summary: &ActivitySummary) -> Option<ChartView> {
    if summary.is_empty() {
        return None;
    }

    let mut traces = Vec::new();

    if !summary.ping_counts_by_day.is_empty() {
        traces.push(TraceView {
            name: "Ping Count".to_string(),
            kind: TraceKind::Bar,
            y_axis: "y1".to_string(),
            x: summary
                .ping_counts_by_day
                .keys()
                .map(|d| d.format(DAY_FORMAT).to_string())
                .collect(),
            y: summary.ping_counts_by_day.values().map(|c| *c as f64).collect(),
            text: Vec::new(),
        });
    }

    if !summary.voltage_trend.is_empty() {
        traces.push(TraceView {
            name: "Battery Voltage".to_string(),
            kind: TraceKind::Line,
            y_axis: "y2".to_string(),
            x: summary
                .voltage_trend
                .iter()
                .map(|p| p.time.format(INSTANT_FORMAT).to_string())
                .collect(),
            y: summary.voltage_trend.iter().map(|p| p.voltage).collect(),
            text: Vec::new(),
        });
    }

    if !summary.charge_markers.is_empty() {
        traces.push(TraceView {
            name: "Charge Min/Max Points".to_string(),
            kind: TraceKind::Markers,
            y_axis: "y2".to_string(),
            x: summary
                .charge_markers
                .iter()
                .map(|m| m.time.format(INSTANT_FORMAT).to_string())
                .collect(),
            y: summary.charge_markers.iter().map(|m| m.voltage).collect(),
            text: summary
                .charge_markers
                .iter()
                .map(|m| {
                    let label = match m.label {
                        MarkerLabel::Start => "Start Voltage",
                        MarkerLabel::Max => "Max Voltage",
                    };
                    format!(
                        "{}: {:.2}V<br>Date: {}",
                        label,
                        m.voltage,
                        m.time.format(HOVER_FORMAT)
                    )
                })
                .collect(),
        });
    }

    let monthly = summary
        .ping_span_days()
        .is_some_and(|days| days > MONTHLY_AXIS_DAYS);
    let x_axis = if monthly {
        AxisView::titled("Month")
    } else {
        AxisView {
            tick_format: Some("%d %b".to_string()),
            tick_angle: 45,
            ..AxisView::titled("Date")
        }
    };

    Some(ChartView {
        title: CHART_TITLE.to_string(),
        traces,
        x_axis,
        y_axis: AxisView::titled("Ping Count"),
        y2_axis: AxisView {
            range: Some(VOLTAGE_AXIS_RANGE),
            ..AxisView::titled("Battery Voltage (V)")
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::charge_analysis::analyze;
    use crate::application::cycle_detector::DetectorParams;
    use crate::domain::telemetry::{EventKind, TelemetrySample};
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn report(samples: Vec<TelemetrySample>) -> DeviceReport {
        let analysis = analyze(samples, &DetectorParams::default());
        DeviceReport {
            device_id: "dev-1".to_string(),
            info: Some(DeviceInfo {
                region: Some("North".to_string()),
                ..DeviceInfo::new("dev-1")
            }),
            range: DateRange::parse("01/01/2024", "31/03/2024").unwrap(),
            ping_count: analysis.ping_count,
            cycles: analysis.cycles,
            summary: analysis.summary,
        }
    }

    fn rising(start: NaiveDateTime, step: TimeDelta) -> Vec<TelemetrySample> {
        [3.0, 3.05, 3.1, 3.6]
            .iter()
            .enumerate()
            .map(|(i, v)| TelemetrySample::new(start + step * i as i32, *v, EventKind::Ping))
            .collect()
    }

    #[test]
    fn test_report_view() {
        let view = report_to_view(&report(rising(t0(), TimeDelta::minutes(10))));

        assert_eq!(view.device, "dev-1");
        assert_eq!(view.region.as_deref(), Some("North"));
        assert_eq!(view.from_date, "01/01/2024");
        assert_eq!(view.to_date, "31/03/2024");
        assert_eq!(view.pings, 4);
        assert_eq!(view.charges, 1);

        let row = &view.charge_details[0];
        assert_eq!(row.charge_count, 1);
        assert_eq!(row.date, "01-01-2024");
        assert_eq!(row.start_voltage, "3.00V");
        assert_eq!(row.max_voltage, "3.60V");
        assert_eq!(row.start_time, "02:05:00 PM");
        assert_eq!(row.status, "Normal");

        let chart = view.chart.unwrap();
        let names: Vec<_> = chart.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Ping Count", "Battery Voltage", "Charge Min/Max Points"]);
        assert_eq!(chart.traces[0].x, vec!["2024-01-01"]);
        assert_eq!(chart.traces[0].y, vec![4.0]);
        assert_eq!(
            chart.traces[2].text[0],
            "Start Voltage: 3.00V<br>Date: 01-01-2024 02:05 PM"
        );
        assert_eq!(chart.x_axis.title, "Date");
        assert_eq!(chart.y2_axis.range, Some([2.8, 4.4]));
    }

    #[test]
    fn test_long_offline_status() {
        let view = report_to_view(&report(rising(t0(), TimeDelta::days(1))));

        assert_eq!(view.long_offline_count, 1);
        assert_eq!(view.charge_details[0].status, "Offline for 3 days 0 hrs 0 mins");
    }

    #[test]
    fn test_monthly_axis_for_long_spans() {
        let mut samples = rising(t0(), TimeDelta::minutes(10));
        samples.push(TelemetrySample::new(t0() + TimeDelta::days(61), 3.5, EventKind::Ping));

        let chart = chart_to_view(&report(samples).summary).unwrap();
        assert_eq!(chart.x_axis.title, "Month");
        assert_eq!(chart.x_axis.tick_format, None);
    }

    #[test]
    fn test_axis_uses_elapsed_ping_span() {
        let late = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        let early = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        let samples = vec![
            TelemetrySample::new(late, 3.5, EventKind::Ping),
            TelemetrySample::new(early, 3.6, EventKind::Ping),
        ];

        let chart = chart_to_view(&report(samples).summary).unwrap();
        assert_eq!(chart.x_axis.title, "Date");
        assert_eq!(chart.x_axis.tick_format.as_deref(), Some("%d %b"));
    }

    #[test]
    fn test_no_chart_without_pings() {
        let samples = vec![TelemetrySample::new(t0(), 3.5, EventKind::Other)];
        let view = report_to_view(&report(samples));

        assert!(view.chart.is_none());
        assert!(view.charge_details.is_empty());
    }

    #[test]
    fn test_marker_trace_omitted_without_cycles() {
        let samples = vec![TelemetrySample::new(t0(), 3.5, EventKind::Ping)];
        let chart = chart_to_view(&report(samples).summary).unwrap();

        assert_eq!(chart.traces.len(), 2);
        assert!(chart.traces.iter().all(|t| t.kind != TraceKind::Markers));
    }

    #[test]
    fn test_stream_message_json() {
        let message = event_to_view(ReportEvent::Complete { elapsed_ms: 12 });
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json, serde_json::json!({"type": "complete", "elapsed_ms": 12}));
    }
}
