use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::quiz::catalog;
use crate::rules::Device;

/// Longest configurable delay: ten minutes.
pub const MAX_DELAY_MS: u64 = 600_000;

/// Delays used to pace messages and scene changes, in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_opening_scene")]
    pub opening_scene: u64,
    #[serde(default = "default_level1_announce")]
    pub level1_announce: u64,
    #[serde(default = "default_level_announce")]
    pub level_announce: u64,
    #[serde(default = "default_level_transition")]
    pub level_transition: u64,
    #[serde(default = "default_quiz_feedback")]
    pub quiz_feedback: u64,
    #[serde(default = "default_door_open")]
    pub door_open: u64,
    #[serde(default = "default_blocked_redirect")]
    pub blocked_redirect: u64,
}

fn default_opening_scene() -> u64 {
    15_000
}
fn default_level1_announce() -> u64 {
    1_000
}
fn default_level_announce() -> u64 {
    2_000
}
fn default_level_transition() -> u64 {
    2_000
}
fn default_quiz_feedback() -> u64 {
    2_000
}
fn default_door_open() -> u64 {
    2_000
}
fn default_blocked_redirect() -> u64 {
    500
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            opening_scene: default_opening_scene(),
            level1_announce: default_level1_announce(),
            level_announce: default_level_announce(),
            level_transition: default_level_transition(),
            quiz_feedback: default_quiz_feedback(),
            door_open: default_door_open(),
            blocked_redirect: default_blocked_redirect(),
        }
    }
}

impl TimingConfig {
    fn validate(&self, errors: &mut Vec<String>) {
        let fields = [
            ("opening_scene", self.opening_scene),
            ("level1_announce", self.level1_announce),
            ("level_announce", self.level_announce),
            ("level_transition", self.level_transition),
            ("quiz_feedback", self.quiz_feedback),
            ("door_open", self.door_open),
            ("blocked_redirect", self.blocked_redirect),
        ];
        for (name, ms) in fields {
            if ms > MAX_DELAY_MS {
                errors.push(format!(
                    "timing.{} must be at most {} ms, got {}. Example: {} = 2000",
                    name, MAX_DELAY_MS, ms, name
                ));
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_save_path")]
    pub save_path: String,
    #[serde(default = "default_websocket_bind")]
    pub websocket_bind: String,
    #[serde(default = "default_websocket_port")]
    pub websocket_port: u16,
    #[serde(default = "default_price_per_kwh")]
    pub price_per_kwh: f64,
    #[serde(default = "default_bill_target")]
    pub bill_target: f64,
    #[serde(default = "default_efficiency_target")]
    pub efficiency_target: f64,
    #[serde(default = "default_quiz_session_length")]
    pub quiz_session_length: usize,
    #[serde(default = "default_placement_tolerance")]
    pub placement_tolerance: f32,
    #[serde(default)]
    pub quiz_seed: Option<u64>,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default = "default_level2_devices")]
    pub level2_devices: Vec<Device>,
    #[serde(default = "default_level3_devices")]
    pub level3_devices: Vec<Device>,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_save_path() -> String {
    "./energy-quest-save.json".to_string()
}
fn default_websocket_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_websocket_port() -> u16 {
    8120
}
fn default_price_per_kwh() -> f64 {
    crate::rules::formulas::DEFAULT_PRICE_PER_KWH
}
fn default_bill_target() -> f64 {
    300_000.0
}
fn default_efficiency_target() -> f64 {
    50.0
}
fn default_quiz_session_length() -> usize {
    10
}
fn default_placement_tolerance() -> f32 {
    0.1
}
fn default_level2_devices() -> Vec<Device> {
    vec![
        Device::new("fridge", 150.0, 0.0, true),
        Device::new("riceCooker", 400.0, 0.0, true),
        Device::new("fan", 50.0, 0.0, true),
        Device::new("iron", 1000.0, 0.0, true),
    ]
}
fn default_level3_devices() -> Vec<Device> {
    vec![
        Device::new("lamp", 60.0, 24.0, true),
        Device::new("ac", 1000.0, 8.0, true),
        Device::new("tv", 150.0, 6.0, true),
        Device::new("fridge", 150.0, 24.0, true),
    ]
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            log_level: default_log_level(),
            save_path: default_save_path(),
            websocket_bind: default_websocket_bind(),
            websocket_port: default_websocket_port(),
            price_per_kwh: default_price_per_kwh(),
            bill_target: default_bill_target(),
            efficiency_target: default_efficiency_target(),
            quiz_session_length: default_quiz_session_length(),
            placement_tolerance: default_placement_tolerance(),
            quiz_seed: None,
            timing: TimingConfig::default(),
            level2_devices: default_level2_devices(),
            level3_devices: default_level3_devices(),
        }
    }
}

impl GameConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let config: GameConfig =
            toml::from_str(content).map_err(|e| format!("{}: {}", source_path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        if self.save_path.trim().is_empty() {
            errors.push(
                "save_path must not be empty. Example: save_path = \"./energy-quest-save.json\""
                    .to_string(),
            );
        }

        if !(1024..=65535).contains(&self.websocket_port) {
            errors.push(format!(
                "websocket_port must be 1024-65535, got {}. Example: websocket_port = 8120",
                self.websocket_port
            ));
        }

        if !(self.price_per_kwh > 0.0 && self.price_per_kwh.is_finite()) {
            errors.push(format!(
                "price_per_kwh must be finite and > 0, got {}. Example: price_per_kwh = 1500.0",
                self.price_per_kwh
            ));
        }

        if !(self.bill_target > 0.0) {
            errors.push(format!(
                "bill_target must be > 0, got {}. Example: bill_target = 300000.0",
                self.bill_target
            ));
        }

        if !(0.0..=100.0).contains(&self.efficiency_target) {
            errors.push(format!(
                "efficiency_target must be 0-100, got {}. Example: efficiency_target = 50.0",
                self.efficiency_target
            ));
        }

        let catalog_len = catalog().len();
        if self.quiz_session_length == 0 || self.quiz_session_length > catalog_len {
            errors.push(format!(
                "quiz_session_length must be 1-{}, got {}. Example: quiz_session_length = 10",
                catalog_len, self.quiz_session_length
            ));
        }

        if !(self.placement_tolerance >= 0.0) {
            errors.push(format!(
                "placement_tolerance must be >= 0, got {}. Example: placement_tolerance = 0.1",
                self.placement_tolerance
            ));
        }

        self.timing.validate(&mut errors);
        validate_devices("level2_devices", &self.level2_devices, &mut errors);
        validate_devices("level3_devices", &self.level3_devices, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}

fn validate_devices(field: &str, devices: &[Device], errors: &mut Vec<String>) {
    if devices.is_empty() {
        errors.push(format!("{} must list at least one device", field));
        return;
    }

    let mut seen = HashSet::new();
    for device in devices {
        if device.name.trim().is_empty() {
            errors.push(format!("{}: device names must not be empty", field));
        } else if !seen.insert(device.name.as_str()) {
            errors.push(format!("{}: duplicate device name '{}'", field, device.name));
        }
        if !(device.watts >= 0.0 && device.watts.is_finite()) {
            errors.push(format!(
                "{}: device '{}' watts must be finite and >= 0, got {}",
                field, device.name, device.watts
            ));
        }
        if !(device.hours >= 0.0 && device.hours.is_finite()) {
            errors.push(format!(
                "{}: device '{}' hours must be finite and >= 0, got {}",
                field, device.name, device.hours
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn test_path() -> PathBuf {
        PathBuf::from("test-config.toml")
    }

    #[test]
    fn valid_config_loads_all_fields() {
        let toml = r#"
            log_level = "debug"
            save_path = "./data/save.json"
            websocket_bind = "0.0.0.0"
            websocket_port = 9090
            price_per_kwh = 1444.7
            bill_target = 250000.0
            efficiency_target = 60.0
            quiz_session_length = 5
            placement_tolerance = 0.25
            quiz_seed = 42

            [timing]
            quiz_feedback = 500
            door_open = 100

            [[level2_devices]]
            name = "kettle"
            watts = 2000.0
            on = false

            [[level3_devices]]
            name = "heater"
            watts = 1500.0
            hours = 4.0
        "#;
        let config = GameConfig::from_toml_str(toml, &test_path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.save_path, "./data/save.json");
        assert_eq!(config.websocket_bind, "0.0.0.0");
        assert_eq!(config.websocket_port, 9090);
        assert_eq!(config.price_per_kwh, 1444.7);
        assert_eq!(config.bill_target, 250000.0);
        assert_eq!(config.efficiency_target, 60.0);
        assert_eq!(config.quiz_session_length, 5);
        assert_eq!(config.placement_tolerance, 0.25);
        assert_eq!(config.quiz_seed, Some(42));
        assert_eq!(config.timing.quiz_feedback, 500);
        assert_eq!(config.timing.door_open, 100);
        assert_eq!(config.timing.opening_scene, 15_000);
        assert_eq!(config.level2_devices, vec![Device::new("kettle", 2000.0, 0.0, false)]);
        assert_eq!(config.level3_devices, vec![Device::new("heater", 1500.0, 4.0, true)]);
    }

    #[test]
    fn defaults_applied_for_empty_config() {
        let config = GameConfig::from_toml_str("", &test_path()).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.save_path, "./energy-quest-save.json");
        assert_eq!(config.websocket_port, 8120);
        assert_eq!(config.price_per_kwh, 1500.0);
        assert_eq!(config.bill_target, 300000.0);
        assert_eq!(config.efficiency_target, 50.0);
        assert_eq!(config.quiz_session_length, 10);
        assert_eq!(config.quiz_seed, None);
        assert_eq!(config.timing, TimingConfig::default());
        assert_eq!(config.level2_devices.len(), 4);
        assert_eq!(config.level3_devices.len(), 4);
    }

    #[test]
    fn default_impl_passes_validation() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn invalid_price_rejected() {
        let err = GameConfig::from_toml_str("price_per_kwh = 0.0", &test_path()).unwrap_err();
        assert!(err.contains("price_per_kwh"));
    }

    #[test]
    fn invalid_efficiency_target_rejected() {
        let err =
            GameConfig::from_toml_str("efficiency_target = 120.0", &test_path()).unwrap_err();
        assert!(err.contains("efficiency_target"));
        assert!(err.contains("0-100"));
    }

    #[test]
    fn quiz_session_longer_than_catalog_rejected() {
        let err =
            GameConfig::from_toml_str("quiz_session_length = 500", &test_path()).unwrap_err();
        assert!(err.contains("quiz_session_length"));
    }

    #[test]
    fn invalid_websocket_port_rejected() {
        let err = GameConfig::from_toml_str("websocket_port = 80", &test_path()).unwrap_err();
        assert!(err.contains("websocket_port"));
        assert!(err.contains("1024-65535"));
    }

    #[test]
    fn invalid_log_level_rejected() {
        let err =
            GameConfig::from_toml_str(r#"log_level = "verbose""#, &test_path()).unwrap_err();
        assert!(err.contains("log_level"));
    }

    #[test]
    fn duplicate_device_names_rejected() {
        let toml = r#"
            [[level3_devices]]
            name = "tv"
            watts = 100.0
            hours = 2.0

            [[level3_devices]]
            name = "tv"
            watts = 150.0
            hours = 6.0
        "#;
        let err = GameConfig::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.contains("duplicate device name 'tv'"));
    }

    #[test]
    fn negative_device_hours_rejected() {
        let toml = r#"
            [[level3_devices]]
            name = "tv"
            watts = 100.0
            hours = -2.0
        "#;
        let err = GameConfig::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.contains("hours must be finite and >= 0"));
    }

    #[test]
    fn infinite_device_values_rejected() {
        let toml = r#"
            [[level2_devices]]
            name = "iron"
            watts = inf

            [[level3_devices]]
            name = "ac"
            watts = 1000.0
            hours = inf
        "#;
        let err = GameConfig::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.contains("level2_devices: device 'iron' watts must be finite"));
        assert!(err.contains("level3_devices: device 'ac' hours must be finite"));
    }

    #[test]
    fn infinite_price_rejected() {
        let err = GameConfig::from_toml_str("price_per_kwh = inf", &test_path()).unwrap_err();
        assert!(err.contains("price_per_kwh must be finite"));
    }

    #[test]
    fn oversized_timing_rejected() {
        let toml = r#"
            [timing]
            level_announce = 9223372036854775807
            level_transition = 600000
        "#;
        let err = GameConfig::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.contains("timing.level_announce must be at most 600000 ms"));
        assert!(!err.contains("timing.level_transition"));
    }

    #[test]
    fn multiple_errors_reported_together() {
        let toml = "price_per_kwh = -1.0\nbill_target = 0.0\nplacement_tolerance = -0.5";
        let err = GameConfig::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.contains("price_per_kwh"));
        assert!(err.contains("bill_target"));
        assert!(err.contains("placement_tolerance"));
    }

    #[test]
    fn malformed_toml_includes_source_path() {
        let err = GameConfig::from_toml_str("price_per_kwh = [invalid", &test_path()).unwrap_err();
        assert!(err.contains("test-config.toml"));
    }

    #[test]
    fn from_file_loads_valid_config() {
        let mut tmp = NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(tmp, "bill_target = 123456.0").unwrap();
        let config = GameConfig::from_file(tmp.path()).unwrap();
        assert_eq!(config.bill_target, 123456.0);
    }

    #[test]
    fn from_file_missing_file_error() {
        let err = GameConfig::from_file(Path::new("/nonexistent/energy-quest.toml")).unwrap_err();
        assert!(err.contains("Cannot read"));
    }

    #[test]
    fn example_file_matches_defaults() {
        let toml = include_str!("../../energy-quest.example.toml");
        let config = GameConfig::from_toml_str(toml, &test_path()).unwrap();
        let defaults = GameConfig::default();
        assert_eq!(config.timing, defaults.timing);
        assert_eq!(config.level2_devices, defaults.level2_devices);
        assert_eq!(config.level3_devices, defaults.level3_devices);
        assert_eq!(config.bill_target, defaults.bill_target);
        assert_eq!(config.websocket_port, defaults.websocket_port);
        assert_eq!(config.quiz_seed, None);
    }
}
