//! Service configuration.
//!
//! The YAML document is merged over [`MonitorConfig::default`] key by key.
//! Absent or `null` keys keep their defaults, as does a whole section that
//! is not a mapping. A key that is present but cannot be read as its type
//! is an error.

use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_yaml::{Mapping, Value};

use crate::error::ConfigError;
use crate::tracing::prelude::*;
use crate::types::Thresholds;

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub thresholds: Thresholds,

    /// Poll period. At least one second.
    pub read_interval_seconds: u64,

    /// Master switch. When off, cycles are skipped but still logged.
    pub alerts_enabled: bool,

    /// Append-only alert log.
    pub alerts_file: PathBuf,

    /// Minimum spacing between accepted alerts. Zero disables debouncing.
    pub debounce_seconds: u64,

    pub simulation: SimulationConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Bound of the uniform jitter added to temperature.
    pub jitter_magnitude: f64,

    /// Fixed seed for reproducible runs. Entropy from the OS when unset.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub enabled: bool,
    pub listen: SocketAddr,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            read_interval_seconds: 2,
            alerts_enabled: true,
            alerts_file: PathBuf::from("alerts.log"),
            debounce_seconds: 5,
            simulation: SimulationConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            jitter_magnitude: 1.0,
            seed: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen: SocketAddr::from(([127, 0, 0, 1], 7786)),
        }
    }
}

impl MonitorConfig {
    pub fn read_interval(&self) -> Duration {
        Duration::from_secs(self.read_interval_seconds)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_secs(self.debounce_seconds)
    }

    /// Load and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        if text.trim().is_empty() {
            return Self::from_value(&Value::Null);
        }

        let document: Value =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_value(&document)
    }

    /// Build a config from an already parsed document.
    pub fn from_value(document: &Value) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let root = section(Some(document), None);
        let thresholds = section(root.and_then(|r| r.get("thresholds")), Some("thresholds"));
        let alerts = section(root.and_then(|r| r.get("alerts")), Some("alerts"));
        let simulation = section(root.and_then(|r| r.get("simulation")), Some("simulation"));
        let api = section(root.and_then(|r| r.get("api")), Some("api"));

        let config = Self {
            thresholds: Thresholds {
                temperature_celsius: float(
                    thresholds,
                    "thresholds.temperature_celsius",
                    defaults.thresholds.temperature_celsius,
                )?,
                pressure_bar: float(
                    thresholds,
                    "thresholds.pressure_bar",
                    defaults.thresholds.pressure_bar,
                )?,
                vibration_mm_s: float(
                    thresholds,
                    "thresholds.vibration_mm_s",
                    defaults.thresholds.vibration_mm_s,
                )?,
            },
            read_interval_seconds: unsigned(
                root,
                "read_interval_seconds",
                defaults.read_interval_seconds,
            )?,
            alerts_enabled: boolean(alerts, "alerts.enabled", defaults.alerts_enabled)?,
            alerts_file: string(alerts, "alerts.file")?
                .map(PathBuf::from)
                .unwrap_or(defaults.alerts_file),
            debounce_seconds: unsigned(alerts, "alerts.debounce_seconds", defaults.debounce_seconds)?,
            simulation: SimulationConfig {
                jitter_magnitude: float(
                    simulation,
                    "simulation.jitter_magnitude",
                    defaults.simulation.jitter_magnitude,
                )?,
                seed: optional_unsigned(simulation, "simulation.seed")?,
            },
            api: ApiConfig {
                enabled: boolean(api, "api.enabled", defaults.api.enabled)?,
                listen: match string(api, "api.listen")? {
                    Some(addr) => addr.parse().map_err(|e| invalid("api.listen", e))?,
                    None => defaults.api.listen,
                },
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = [
            ("thresholds.temperature_celsius", self.thresholds.temperature_celsius),
            ("thresholds.pressure_bar", self.thresholds.pressure_bar),
            ("thresholds.vibration_mm_s", self.thresholds.vibration_mm_s),
        ];
        for (key, value) in thresholds {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(key, format!("must be a positive number, got {value}")));
            }
        }

        if self.read_interval_seconds == 0 {
            return Err(invalid("read_interval_seconds", "must be at least 1"));
        }

        let jitter = self.simulation.jitter_magnitude;
        if !jitter.is_finite() || jitter < 0.0 {
            return Err(invalid(
                "simulation.jitter_magnitude",
                format!("must be a non-negative number, got {jitter}"),
            ));
        }

        if self.alerts_file.as_os_str().is_empty() {
            return Err(invalid("alerts.file", "must not be empty"));
        }

        Ok(())
    }
}

fn invalid(key: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidField {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Resolve a section to a mapping. Anything other than a mapping falls
/// back to defaults; a non-null non-mapping is worth a warning.
fn section<'a>(value: Option<&'a Value>, name: Option<&str>) -> Option<&'a Mapping> {
    match value {
        Some(Value::Mapping(mapping)) => Some(mapping),
        None | Some(Value::Null) => None,
        Some(other) => {
            warn!(
                event = "config_section_ignored",
                section = name.unwrap_or("<root>"),
                found = ?other,
                "Config section is not a mapping, using defaults"
            );
            None
        }
    }
}

/// Leaf lookup by the last component of a dotted key.
fn leaf<'a>(section: Option<&'a Mapping>, key: &str) -> Option<&'a Value> {
    let name = key.rsplit('.').next().unwrap_or(key);
    section
        .and_then(|s| s.get(name))
        .filter(|v| !v.is_null())
}

fn float(section: Option<&Mapping>, key: &str, default: f64) -> Result<f64, ConfigError> {
    match leaf(section, key) {
        None => Ok(default),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| invalid(key, "not representable as a number")),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| invalid(key, format!("expected a number, got {s:?}"))),
        Some(other) => Err(invalid(key, format!("expected a number, got {other:?}"))),
    }
}

fn optional_unsigned(section: Option<&Mapping>, key: &str) -> Result<Option<u64>, ConfigError> {
    match leaf(section, key) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| invalid(key, format!("expected a non-negative integer, got {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, format!("expected a non-negative integer, got {s:?}"))),
        Some(other) => Err(invalid(
            key,
            format!("expected a non-negative integer, got {other:?}"),
        )),
    }
}

fn unsigned(section: Option<&Mapping>, key: &str, default: u64) -> Result<u64, ConfigError> {
    Ok(optional_unsigned(section, key)?.unwrap_or(default))
}

fn boolean(section: Option<&Mapping>, key: &str, default: bool) -> Result<bool, ConfigError> {
    match leaf(section, key) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(invalid(key, format!("expected true or false, got {other:?}"))),
    }
}

fn string(section: Option<&Mapping>, key: &str) -> Result<Option<String>, ConfigError> {
    match leaf(section, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(key, format!("expected a string, got {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<MonitorConfig, ConfigError> {
        let document: Value = serde_yaml::from_str(yaml).unwrap();
        MonitorConfig::from_value(&document)
    }

    #[test]
    fn should_load_values_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            r#"
thresholds:
  temperature_celsius: 95.0
  pressure_bar: 110.0
  vibration_mm_s: 4.5
read_interval_seconds: 3
alerts:
  enabled: true
  file: alerts.log
  debounce_seconds: 10
"#,
        )
        .unwrap();

        let config = MonitorConfig::load(&path).unwrap();

        assert_eq!(config.thresholds.temperature_celsius, 95.0);
        assert_eq!(config.thresholds.pressure_bar, 110.0);
        assert_eq!(config.thresholds.vibration_mm_s, 4.5);
        assert_eq!(config.read_interval_seconds, 3);
        assert_eq!(config.debounce_seconds, 10);
        assert_eq!(config.alerts_file, PathBuf::from("alerts.log"));
        assert!(config.alerts_enabled);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = MonitorConfig::load(&dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn yaml_syntax_error_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "thresholds: [unclosed").unwrap();

        let result = MonitorConfig::load(&path);

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn empty_document_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "").unwrap();

        assert_eq!(MonitorConfig::load(&path).unwrap(), MonitorConfig::default());
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = MonitorConfig::default();
        assert_eq!(config.thresholds.temperature_celsius, 90.0);
        assert_eq!(config.thresholds.pressure_bar, 120.0);
        assert_eq!(config.thresholds.vibration_mm_s, 5.0);
        assert_eq!(config.read_interval(), Duration::from_secs(2));
        assert!(config.alerts_enabled);
        assert_eq!(config.alerts_file, PathBuf::from("alerts.log"));
        assert_eq!(config.debounce_window(), Duration::from_secs(5));
        assert_eq!(config.simulation.jitter_magnitude, 1.0);
        assert!(config.api.enabled);
    }

    #[test]
    fn partial_sections_merge_over_defaults() {
        let config = parse("thresholds:\n  pressure_bar: 150\nalerts:\n  enabled: false\n").unwrap();

        assert_eq!(config.thresholds.pressure_bar, 150.0);
        assert_eq!(config.thresholds.temperature_celsius, 90.0);
        assert!(!config.alerts_enabled);
        assert_eq!(config.debounce_seconds, 5);
    }

    #[test]
    fn non_mapping_sections_fall_back_to_defaults() {
        let config = parse("thresholds: 12\nalerts: [1, 2]\napi: null\n").unwrap();

        assert_eq!(config.thresholds, Thresholds::default());
        assert!(config.alerts_enabled);
        assert!(config.api.enabled);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let config = parse("thresholds:\n  temperature_celsius: \"95.5\"\nread_interval_seconds: \"4\"\n").unwrap();

        assert_eq!(config.thresholds.temperature_celsius, 95.5);
        assert_eq!(config.read_interval_seconds, 4);
    }

    #[test]
    fn unparsable_field_is_an_error() {
        let result = parse("thresholds:\n  temperature_celsius: hot\n");

        match result {
            Err(ConfigError::InvalidField { key, .. }) => {
                assert_eq!(key, "thresholds.temperature_celsius")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn negative_debounce_is_an_error() {
        let result = parse("alerts:\n  debounce_seconds: -1\n");
        assert!(matches!(result, Err(ConfigError::InvalidField { .. })));
    }

    #[test]
    fn zero_read_interval_is_an_error() {
        let result = parse("read_interval_seconds: 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidField { .. })));
    }

    #[test]
    fn non_positive_threshold_is_an_error() {
        let result = parse("thresholds:\n  vibration_mm_s: 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidField { .. })));
    }

    #[test]
    fn negative_jitter_is_an_error() {
        let result = parse("simulation:\n  jitter_magnitude: -0.5\n");
        assert!(matches!(result, Err(ConfigError::InvalidField { .. })));
    }

    #[test]
    fn zero_debounce_is_allowed() {
        let config = parse("alerts:\n  debounce_seconds: 0\n").unwrap();
        assert_eq!(config.debounce_window(), Duration::ZERO);
    }

    #[test]
    fn simulation_and_api_keys_are_read() {
        let config =
            parse("simulation:\n  jitter_magnitude: 0\n  seed: 42\napi:\n  enabled: false\n  listen: 0.0.0.0:9000\n")
                .unwrap();

        assert_eq!(config.simulation.jitter_magnitude, 0.0);
        assert_eq!(config.simulation.seed, Some(42));
        assert!(!config.api.enabled);
        assert_eq!(config.api.listen, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn bad_listen_address_is_an_error() {
        let result = parse("api:\n  listen: not-an-address\n");
        assert!(matches!(result, Err(ConfigError::InvalidField { .. })));
    }
}
