use std::time::Duration;

use serde::Deserialize;

use super::switch::DEFAULT_PORT;
use super::words::DEFAULT_LANGUAGE;

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Configuration for one word clock
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Address of the clock on the local network
    pub ip_address: String,

    /// Language edition of the clock (default: "German").
    ///
    /// Kept as free text: an unknown language disables the entry's switches
    /// at setup instead of failing the whole configuration.
    #[serde(default = "default_language")]
    pub language: String,

    /// Port of the clock's word API (default: 2023)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between status polls (default: 30)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Enable this clock (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Config {
    pub fn new(ip_address: &str, language: &str) -> Self {
        Self {
            ip_address: ip_address.to_string(),
            language: language.to_string(),
            port: default_port(),
            poll_interval_secs: default_poll_interval_secs(),
            enabled: true,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str(r#"ip_address = "192.168.1.50""#).unwrap();
        assert_eq!(config, Config::new("192.168.1.50", "German"));
        assert_eq!(config.port, 2023);
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert!(config.enabled);
    }

    #[test]
    fn test_unknown_language_still_parses() {
        let config: Config = toml::from_str(
            r#"
            ip_address = "192.168.1.50"
            language = "Klingon"
            "#,
        )
        .unwrap();
        assert_eq!(config.language, "Klingon");
    }
}
