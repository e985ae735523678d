//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BlinkmouseError, BlinkmouseResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pointer and gesture analysis settings.
    pub analyzer: AnalyzerSettings,

    /// Tick loop and sink settings.
    pub session: SessionSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// User-facing analyzer settings. Out-of-range values are clamped by the
/// analyzer when applied, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Pointer gain, 0 to 50. X gain is `e^(s/10)`, Y uses `s + 2`.
    pub sensitivity: f64,

    /// Low-pass smoothness, 2 to 20.
    pub smoothness: f64,

    /// Response curve level, 0 (linear) to 5.
    pub acceleration_level: u8,

    /// Reclassify idle, infrequent blinks as natural (non-input) blinks.
    pub filter_natural_blinks: bool,

    /// Flip the horizontal pointer axis.
    pub reverse_x: bool,

    /// Flip the vertical pointer axis.
    pub reverse_y: bool,

    /// Gesture timing windows.
    pub timings: BlinkTimings,
}

/// Timing windows and thresholds of the blink state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkTimings {
    /// Nothing is analysed until this long after the last both-eyes gesture.
    pub min_both_interval_ms: u64,

    /// Minimum gap between single-eye gestures.
    pub min_single_interval_ms: u64,

    /// A both-eyes closure longer than this is a long blink.
    pub long_blink_ms: u64,

    /// A both-eyes gesture completing sooner than this after the previous
    /// one is a double blink.
    pub double_blink_ms: u64,

    /// A blink this long after the previous one, with little pointer
    /// movement in between, is considered natural.
    pub natural_blink_ms: u64,

    /// Accumulated pointer movement below which a blink may be natural.
    pub natural_blink_movement: f64,

    /// The other eye's openness trend must stay above this for a
    /// single-eye gesture to start.
    pub closing_trend: f64,
}

/// Session loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Tick period of the processing loop (ms).
    pub tick_interval_ms: u64,

    /// Gestures are analysed only while the filtered move is shorter than this.
    pub stationary_threshold_px: f64,

    /// Snapshots older than this are ignored.
    pub detection_timeout_ms: u64,

    /// Forward moves and actions to the pointer sink.
    pub capture_enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "blinkmouse=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            sensitivity: 25.0,
            smoothness: 10.0,
            acceleration_level: 3,
            filter_natural_blinks: true,
            reverse_x: false,
            reverse_y: false,
            timings: BlinkTimings::default(),
        }
    }
}

impl Default for BlinkTimings {
    fn default() -> Self {
        Self {
            min_both_interval_ms: 210,
            min_single_interval_ms: 350,
            long_blink_ms: 400,
            double_blink_ms: 370,
            natural_blink_ms: 6000,
            natural_blink_movement: 80.0,
            closing_trend: -0.1,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 32,
            stationary_threshold_px: 5.0,
            detection_timeout_ms: 20_000,
            capture_enabled: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], errors
    /// are returned rather than replaced by defaults.
    pub fn load_from(path: &Path) -> BlinkmouseResult<Self> {
        if !path.exists() {
            return Err(BlinkmouseError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| BlinkmouseError::config(format!("{}: {e}", path.display())))
    }

    /// Save config to the standard location.
    pub fn save(&self) -> BlinkmouseResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> BlinkmouseResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("blinkmouse").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.analyzer.sensitivity, 25.0);
        assert_eq!(config.analyzer.smoothness, 10.0);
        assert_eq!(config.analyzer.acceleration_level, 3);
        assert!(config.analyzer.filter_natural_blinks);
        assert_eq!(config.analyzer.timings.min_both_interval_ms, 210);
        assert_eq!(config.session.tick_interval_ms, 32);
        assert!(!config.session.capture_enabled);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let raw = r#"{ "analyzer": { "sensitivity": 40.0, "reverse_x": true } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.analyzer.sensitivity, 40.0);
        assert!(config.analyzer.reverse_x);
        assert_eq!(config.analyzer.smoothness, 10.0);
        assert_eq!(config.analyzer.timings, BlinkTimings::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("blinkmouse_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.analyzer.acceleration_level = 5;
        config.session.capture_enabled = true;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("blinkmouse_missing").join("none.json");
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, BlinkmouseError::FileNotFound { .. }));
    }
}
