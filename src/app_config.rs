use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use crate::errors::ConfigError;

/// Application configuration module
/// This module handles the application configuration: loading it from an
/// optional JSON file, validating it and exposing defaults.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// What to do when a shift would produce a negative timestamp
    #[serde(default)]
    pub negative_time_policy: NegativeTimePolicy,

    /// Log a warning for every malformed SRT block that gets skipped
    #[serde(default = "default_true")]
    pub warn_on_skipped_blocks: bool,

    /// Video duration probe settings
    #[serde(default)]
    pub video_probe: VideoProbeConfig,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Policy applied when shifting a timestamp yields a time before zero
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NegativeTimePolicy {
    /// Abort the combine with an error
    #[default]
    Error,
    /// Clamp the timestamp to 00:00:00,000
    Clamp,
}

/// ffprobe-based duration lookup configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VideoProbeConfig {
    /// Whether video durations may be probed at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path or name of the ffprobe binary
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Per-video probe timeout in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VideoProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ffprobe_path: default_ffprobe_path(),
            timeout_secs: default_probe_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    60
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.video_probe.enabled {
            if self.video_probe.ffprobe_path.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "video_probe.ffprobe_path must not be empty when probing is enabled".to_string(),
                ).into());
            }
            if self.video_probe.timeout_secs == 0 {
                return Err(ConfigError::InvalidValue(
                    "video_probe.timeout_secs must be greater than zero".to_string(),
                ).into());
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: LogLevel::default(),
            negative_time_policy: NegativeTimePolicy::default(),
            warn_on_skipped_blocks: true,
            video_probe: VideoProbeConfig::default(),
        }
    }
}
