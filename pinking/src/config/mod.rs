//! Runtime configuration
//!
//! Settings come from an optional TOML file (`pinking.toml` by default) and
//! are then overridden by command-line flags. Every field has a default, so
//! an empty or missing file is a valid configuration.

pub mod loader;

use log::LevelFilter;
use serde::Deserialize;

use pinking_core::layout::MAX_PINS;
use pinking_hal::{Channel, Pull};

use crate::cli::Args;
use crate::tasks::tick::TICK_INTERVAL_MS;

pub use loader::{load, ConfigError};

/// Simulated board settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Channels that read High when the simulator starts
    pub high_channels: Vec<Channel>,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Board revision override
    pub revision: Option<String>,
    /// Use the simulated backend
    pub fake_gpio: bool,
    /// Input poll interval; 0 disables polling
    pub poll_interval_ms: u64,
    /// Pull resistor applied to inputs
    pub pull: Pull,
    /// Log level name
    pub log_level: String,
    pub simulation: SimulationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            revision: None,
            fake_gpio: false,
            poll_interval_ms: TICK_INTERVAL_MS,
            pull: Pull::Down,
            log_level: "info".into(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check for us
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.level()?;

        if let Some(rev) = &self.revision {
            if rev.trim().is_empty() {
                return Err(ConfigError::Invalid("revision must not be empty".into()));
            }
        }

        for &channel in &self.simulation.high_channels {
            if channel == 0 || channel as usize > MAX_PINS {
                return Err(ConfigError::Invalid(format!(
                    "simulation channel {} is outside 1..={}",
                    channel, MAX_PINS
                )));
            }
        }

        Ok(())
    }

    /// Log level as a filter
    pub fn level(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {:?}", self.log_level)))
    }

    /// Apply command-line overrides
    pub fn apply(&mut self, args: &Args) {
        if args.fake_gpio {
            self.fake_gpio = true;
        }
        if let Some(rev) = &args.revision {
            self.revision = Some(rev.clone());
        }
        if let Some(ms) = args.poll_ms {
            self.poll_interval_ms = ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_sample_file_parses() {
        let config = Config::from_toml(include_str!("../../pinking.toml")).unwrap();
        assert!(!config.fake_gpio);
        assert_eq!(config.revision, None);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.pull, Pull::Down);
        assert_eq!(config.level().unwrap(), LevelFilter::Info);
        assert_eq!(config.simulation.high_channels, vec![11, 13]);
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_toml(
            r#"
            revision = "a21041"
            fake_gpio = true
            poll_interval_ms = 0
            pull = "up"
            log_level = "debug"

            [simulation]
            high_channels = [40]
            "#,
        )
        .unwrap();
        assert_eq!(config.revision.as_deref(), Some("a21041"));
        assert!(config.fake_gpio);
        assert_eq!(config.poll_interval_ms, 0);
        assert_eq!(config.pull, Pull::Up);
        assert_eq!(config.level().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::from_toml("log_level = \"loud\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[simulation]\nhigh_channels = [41]"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("revision = \"  \""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("pull = \"sideways\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_toml("colour = true"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();
        let args = Args {
            fake_gpio: true,
            revision: Some("a02082".into()),
            poll_ms: Some(20),
            ..Args::default()
        };
        config.apply(&args);
        assert!(config.fake_gpio);
        assert_eq!(config.revision.as_deref(), Some("a02082"));
        assert_eq!(config.poll_interval_ms, 20);

        // Absent flags leave the file's values alone
        let mut config = Config {
            fake_gpio: true,
            ..Config::default()
        };
        config.apply(&Args::default());
        assert!(config.fake_gpio);
        assert_eq!(config.poll_interval_ms, TICK_INTERVAL_MS);
    }
}
