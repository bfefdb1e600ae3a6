//! Configuration loading and typed config structures for the Pyre engine.
//!
//! The engine configuration lives in `pyre-config.yaml`. Every field has a
//! default, so an empty file (or no file at all) yields a working setup.
//! Level layouts are YAML documents of their own and load through
//! [`load_level`].

use std::path::Path;
use std::time::Duration;

use pyre_world::LevelLayout;
use serde::Deserialize;

/// Errors that can occur when loading configuration or level files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `pyre-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PyreConfig {
    /// Nominal step durations.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Run bounds and pacing.
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PyreConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `PYRE_LOG` overrides `logging.level`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        Ok(config)
    }
}

/// How long each kind of step nominally takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Duration of a dispatched command, in milliseconds.
    #[serde(default = "default_step_duration_ms")]
    pub step_duration_ms: u64,

    /// Duration of an `IfStart`, an `Else` or a taken loop jump, in
    /// milliseconds.
    #[serde(default = "default_loop_delay_ms")]
    pub loop_delay_ms: u64,
}

impl TimingConfig {
    /// Duration of a dispatched command.
    pub const fn step_duration(&self) -> Duration {
        Duration::from_millis(self.step_duration_ms)
    }

    /// Duration of a structural step that costs time.
    pub const fn loop_delay(&self) -> Duration {
        Duration::from_millis(self.loop_delay_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            step_duration_ms: default_step_duration_ms(),
            loop_delay_ms: default_loop_delay_ms(),
        }
    }
}

/// Bounds and pacing of a driven run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Stop after this many engine steps (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Playback speed in percent of nominal; 200 halves every delay.
    #[serde(default = "default_speed_percent")]
    pub speed_percent: u32,

    /// Sleep between steps. When off, the run completes as fast as it can.
    #[serde(default = "default_true")]
    pub realtime: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            speed_percent: default_speed_percent(),
            realtime: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// Apply the `PYRE_LOG` environment override.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PYRE_LOG") {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Load a level layout from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or
/// [`ConfigError::Yaml`] if the content is not a valid layout.
pub fn load_level(path: &Path) -> Result<LevelLayout, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_level(&contents)
}

/// Parse a level layout from a YAML string.
///
/// # Errors
///
/// Returns [`ConfigError::Yaml`] if the string is not a valid layout.
pub fn parse_level(yaml: &str) -> Result<LevelLayout, ConfigError> {
    Ok(serde_yml::from_str(yaml)?)
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_step_duration_ms() -> u64 {
    800
}

const fn default_loop_delay_ms() -> u64 {
    100
}

const fn default_max_ticks() -> u64 {
    10_000
}

const fn default_speed_percent() -> u32 {
    100
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}
