//! Configuration file parsing and structures.
//!
//! wordclockd uses a single TOML file. Every word clock is one entry under
//! `[integrations.wordclock.<entry>]`; entries are independent of each other.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::filter::Targets;

/// Top-level configuration structure
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// HTTP API; disabled when the section is absent
    #[serde(default)]
    pub api: Option<ApiConfig>,

    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

#[derive(
    Debug,
    Default,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,

    /// Per-target levels, e.g. `"wordclockd::engine" = "debug"`
    #[serde(default)]
    pub overrides: HashMap<String, LogLevel>,
}

impl LoggingConfig {
    /// Build the tracing filter for this configuration
    ///
    /// `level` replaces the configured default level when given (command line wins).
    pub fn targets(&self, level: Option<LogLevel>) -> Targets {
        let default = level.unwrap_or(self.level);
        Targets::new().with_default(default).with_targets(
            self.overrides
                .iter()
                .map(|(target, level)| (target.clone(), LevelFilter::from(*level))),
        )
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_api_port")]
    pub port: u16,
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8565
}

/// Integration configuration container
#[derive(Debug, Default, Deserialize)]
pub struct IntegrationsConfig {
    /// Word clocks, keyed by entry name
    #[cfg(feature = "integration_wordclock")]
    #[serde(default)]
    pub wordclock: BTreeMap<String, crate::integrations::wordclock::WordClockConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        #[cfg(feature = "integration_wordclock")]
        for (entry_id, entry) in &self.integrations.wordclock {
            if entry.ip_address.trim().is_empty() {
                return Err(format!(
                    "integrations.wordclock.{}.ip_address must not be empty",
                    entry_id
                ));
            }
            if entry.poll_interval_secs == 0 {
                return Err(format!(
                    "integrations.wordclock.{}.poll_interval_secs must be greater than zero",
                    entry_id
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
