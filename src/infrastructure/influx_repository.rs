// InfluxDB repository implementation
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::date_range::DateRange;
use crate::domain::device::DeviceInfo;
use crate::domain::telemetry::{EventKind, TelemetrySample};
use crate::infrastructure::config::{prepare_query, InfluxSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

const SAMPLES_QUERY: &str = "SELECT battery_voltage, event FROM ${measurement} \
     WHERE device = '${device}' AND time >= '${from}' AND time <= '${to}'";
const DEVICE_QUERY: &str = "SELECT sim_type, device, region, branch FROM ${measurement} \
     WHERE device = '${device}'";
const DEVICES_QUERY: &str = "SELECT sim_type, device, region, branch FROM ${measurement}";

/// Stored instants carry the device's wall-clock time; the offset is ignored
const INFLUX_TIME: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    samples_measurement: String,
    devices_measurement: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    #[allow(dead_code)]
    name: String,
    columns: Vec<String>,
    values: Vec<Vec<Value>>,
}

impl InfluxQLResponse {
    fn series(&self) -> impl Iterator<Item = &InfluxQLSeries> {
        self.results
            .iter()
            .filter_map(|r| r.series.as_ref())
            .flatten()
    }
}

impl InfluxQLSeries {
    fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

fn cell(row: &[Value], index: Option<usize>) -> Option<&Value> {
    index.and_then(|i| row.get(i))
}

fn text(row: &[Value], index: Option<usize>) -> Option<String> {
    cell(row, index)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Voltages may have been written as numbers or as text
fn voltage(row: &[Value], index: Option<usize>) -> Option<f64> {
    let value = cell(row, index)?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|v: &f64| v.is_finite())
}

fn timestamp(row: &[Value], index: Option<usize>) -> Option<NaiveDateTime> {
    let raw = cell(row, index)?.as_str()?;
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.naive_local())
}

/// Escapes a value for use inside a single-quoted InfluxQL literal
fn quote_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Rows missing a readable time or voltage are dropped.
fn parse_samples(response: &InfluxQLResponse) -> Vec<TelemetrySample> {
    let mut samples = Vec::new();
    let mut dropped = 0usize;

    for series in response.series() {
        let time_idx = series.column("time");
        let voltage_idx = series.column("battery_voltage");
        let event_idx = series.column("event");

        for row in &series.values {
            match (timestamp(row, time_idx), voltage(row, voltage_idx)) {
                (Some(time), Some(volts)) => {
                    let event = text(row, event_idx)
                        .map(|e| EventKind::parse(&e))
                        .unwrap_or(EventKind::Other);
                    samples.push(TelemetrySample::new(time, volts, event));
                }
                _ => dropped += 1,
            }
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} unreadable telemetry rows", dropped);
    }
    samples
}

/// Later rows for the same device replace earlier ones.
fn parse_devices(response: &InfluxQLResponse) -> Vec<DeviceInfo> {
    let mut devices = BTreeMap::new();

    for series in response.series() {
        let device_idx = series.column("device");
        let region_idx = series.column("region");
        let branch_idx = series.column("branch");
        let sim_idx = series.column("sim_type");

        for row in &series.values {
            let Some(id) = text(row, device_idx) else {
                continue;
            };
            let info = DeviceInfo {
                region: text(row, region_idx),
                branch: text(row, branch_idx),
                sim_type: text(row, sim_idx),
                ..DeviceInfo::new(&id)
            };
            devices.insert(info.id.clone(), info);
        }
    }

    devices.into_values().collect()
}

impl InfluxRepository {
    pub fn new(settings: InfluxSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: settings.host.trim_end_matches('/').to_string(),
            token: settings.token,
            database: settings.database,
            retention_policy: settings.retention_policy,
            samples_measurement: settings.samples_measurement,
            devices_measurement: settings.devices_measurement,
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn render(&self, template: &str, measurement: &str, vars: &[(&str, String)]) -> String {
        let mut map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), quote_literal(v)))
            .collect();
        map.insert("measurement".to_string(), measurement.to_string());
        prepare_query(template, &map)
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        tracing::debug!("Executing InfluxQL query: {}", query);
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(error) = data.results.iter().find_map(|r| r.error.as_ref()) {
            anyhow::bail!("InfluxDB query error: {}", error);
        }

        Ok(data)
    }
}

#[async_trait]
impl TelemetryRepository for InfluxRepository {
    async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let query = self.render(DEVICES_QUERY, &self.devices_measurement, &[]);
        let response = self.execute_query(&query).await?;

        let devices = parse_devices(&response);
        tracing::debug!("Found {} devices", devices.len());
        Ok(devices)
    }

    async fn get_device_info(&self, device_id: &str) -> Result<Option<DeviceInfo>> {
        let query = self.render(
            DEVICE_QUERY,
            &self.devices_measurement,
            &[("device", device_id.to_string())],
        );
        let response = self.execute_query(&query).await?;

        Ok(parse_devices(&response).into_iter().next())
    }

    async fn fetch_samples(&self, device_id: &str, range: &DateRange) -> Result<Vec<TelemetrySample>> {
        let query = self.render(
            SAMPLES_QUERY,
            &self.samples_measurement,
            &[
                ("device", device_id.to_string()),
                ("from", range.start().format(INFLUX_TIME).to_string()),
                ("to", range.end().format(INFLUX_TIME).to_string()),
            ],
        );
        let response = self.execute_query(&query).await?;

        Ok(parse_samples(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn settings() -> InfluxSettings {
        InfluxSettings {
            host: "http://influx:8086/".to_string(),
            token: "secret".to_string(),
            database: "tracker".to_string(),
            retention_policy: "autogen".to_string(),
            samples_measurement: "gps_data".to_string(),
            devices_measurement: "device_info".to_string(),
        }
    }

    fn response(body: &str) -> InfluxQLResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_parse_samples_drops_unreadable_rows() {
        let body = r#"{"results":[{"series":[{
            "name":"gps_data",
            "columns":["time","battery_voltage","event"],
            "values":[
                ["2024-01-01T08:00:00Z", 3.61, "REBOOT"],
                ["2024-01-01T09:00:00Z", "3.7", "g_ping"],
                ["2024-01-01T10:00:00Z", null, "G_PING"],
                ["2024-01-01T11:00:00Z", "n/a", "G_PING"],
                ["not a time", 3.8, "G_PING"],
                ["2024-01-01T12:00:00Z", 3.9, null]
            ]}]}]}"#;

        let samples = parse_samples(&response(body));

        assert_eq!(samples.len(), 3);
        assert_eq!(
            samples[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap()
        );
        assert_eq!(samples[0].event, EventKind::Reboot);
        assert_eq!(samples[1].voltage, 3.7);
        assert_eq!(samples[1].event, EventKind::Ping);
        assert_eq!(samples[2].event, EventKind::Other);
    }

    #[test]
    fn test_offset_is_kept_as_wall_clock() {
        let body = r#"{"results":[{"series":[{
            "name":"gps_data",
            "columns":["time","battery_voltage","event"],
            "values":[["2024-01-01T23:30:00+05:30", 3.6, "G_PING"]]}]}]}"#;

        let samples = parse_samples(&response(body));
        assert_eq!(
            samples[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(23, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_devices_keeps_latest_row() {
        let body = r#"{"results":[{"series":[{
            "name":"device_info",
            "columns":["time","sim_type","device","region","branch"],
            "values":[
                ["2024-01-01T00:00:00Z", "M2M", "dev-1", "North", "Old"],
                ["2024-02-01T00:00:00Z", "M2M", "dev-1", "North", "New"],
                ["2024-02-01T00:00:00Z", null, "dev-2", "", null],
                ["2024-02-01T00:00:00Z", "M2M", null, "South", "X"]
            ]}]}]}"#;

        let devices = parse_devices(&response(body));

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].branch.as_deref(), Some("New"));
        assert_eq!(devices[1].id, "dev-2");
        assert_eq!(devices[1].region, None);
    }

    #[test]
    fn test_empty_result() {
        let body = r#"{"results":[{"statement_id":0}]}"#;
        assert!(parse_samples(&response(body)).is_empty());
        assert!(parse_devices(&response(body)).is_empty());
    }

    #[test]
    fn test_render_escapes_literals() {
        let repository = InfluxRepository::new(settings());
        let range = DateRange::parse("01/01/2024", "02/01/2024").unwrap();

        let query = repository.render(
            SAMPLES_QUERY,
            "gps_data",
            &[
                ("device", "o'brien".to_string()),
                ("from", range.start().format(INFLUX_TIME).to_string()),
                ("to", range.end().format(INFLUX_TIME).to_string()),
            ],
        );

        assert_eq!(
            query,
            "SELECT battery_voltage, event FROM gps_data WHERE device = 'o\\'brien' \
             AND time >= '2024-01-01T00:00:00Z' AND time <= '2024-01-02T23:59:59Z'"
        );
    }

    #[test]
    fn test_build_query_url() {
        let repository = InfluxRepository::new(settings());
        assert_eq!(
            repository.build_query_url("SHOW MEASUREMENTS"),
            "http://influx:8086/query?db=tracker&rp=autogen&q=SHOW%20MEASUREMENTS"
        );
    }
}
