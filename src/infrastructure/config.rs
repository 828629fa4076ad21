use crate::application::cycle_detector::{DEFAULT_RISE_THRESHOLD, DEFAULT_WINDOW, DetectorParams};
use crate::domain::error::TrackerError;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxConfig {
    pub influx: InfluxSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    #[serde(default = "default_samples_measurement")]
    pub samples_measurement: String,
    #[serde(default = "default_devices_measurement")]
    pub devices_measurement: String,
}

fn default_samples_measurement() -> String {
    "gps_data".to_string()
}

fn default_devices_measurement() -> String {
    "device_info".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrackerConfig {
    pub server: ServerSettings,
    pub detection: DetectionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectionSettings {
    pub rise_threshold: f64,
    pub window: usize,
}

impl DetectionSettings {
    pub fn params(&self) -> Result<DetectorParams, TrackerError> {
        DetectorParams::new(self.rise_threshold, self.window)
    }
}

pub fn load_influx_config() -> anyhow::Result<InfluxConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/influx"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_tracker_config() -> anyhow::Result<TrackerConfig> {
    build_tracker_config(config::File::with_name("config/tracker").required(false))
}

fn build_tracker_config<S>(file: S) -> anyhow::Result<TrackerConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("detection.rise_threshold", DEFAULT_RISE_THRESHOLD)?
        .set_default("detection.window", DEFAULT_WINDOW as u64)?
        .add_source(file)
        .add_source(config::Environment::with_prefix("TRACKER").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_prepare_query() {
        let mut vars = HashMap::new();
        vars.insert("device".to_string(), "864231045".to_string());
        vars.insert("from".to_string(), "2024-01-01T00:00:00Z".to_string());

        let query = "SELECT battery_voltage FROM gps_data WHERE device = '${device}' AND time >= '${from}'";
        let result = prepare_query(query, &vars);

        assert_eq!(
            result,
            "SELECT battery_voltage FROM gps_data WHERE device = '864231045' AND time >= '2024-01-01T00:00:00Z'"
        );
    }

    #[test]
    fn test_tracker_defaults() {
        let config = build_tracker_config(config::File::from_str("", FileFormat::Toml)).unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.detection.params().unwrap(), DetectorParams::default());
    }

    #[test]
    fn test_tracker_file_overrides() {
        let file = config::File::from_str(
            "[detection]\nrise_threshold = 0.2\nwindow = 5\n",
            FileFormat::Toml,
        );
        let config = build_tracker_config(file).unwrap();

        let params = config.detection.params().unwrap();
        assert_eq!(params.rise_threshold(), 0.2);
        assert_eq!(params.window(), 5);
    }

    #[test]
    fn test_invalid_detection_settings() {
        let file = config::File::from_str("[detection]\nwindow = 0\n", FileFormat::Toml);
        let config = build_tracker_config(file).unwrap();

        assert_eq!(config.detection.params(), Err(TrackerError::ZeroWindow));
    }
}
