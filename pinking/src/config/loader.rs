//! Configuration loading
//!
//! Reads the configuration file from disk. The default file is optional and
//! silently replaced by built-in defaults when absent; a file named on the
//! command line must exist.

use std::io;
use std::path::{Path, PathBuf};
use std::{fs, io::ErrorKind};

use log::{debug, info};

use super::Config;

/// File looked up in the working directory when no path is given
pub const DEFAULT_PATH: &str = "pinking.toml";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// File is not valid TOML or has unexpected keys
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration
///
/// With `path` set the file must exist. Without it, [`DEFAULT_PATH`] is used
/// if present and defaults otherwise.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_PATH), false),
    };

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound && !required => {
            debug!("No {} found, using defaults", path.display());
            return Ok(Config::default());
        }
        Err(source) => return Err(ConfigError::Io { path, source }),
    };

    let config = Config::from_toml(&text)?;
    info!("Loaded configuration from {}", path.display());
    log_config_summary(&config);
    Ok(config)
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &Config) {
    debug!(
        "Config: fake_gpio={} poll={}ms pull={:?} log_level={}",
        config.fake_gpio, config.poll_interval_ms, config.pull, config.log_level
    );
    if let Some(rev) = &config.revision {
        debug!("  revision override: {}", rev);
    }
    if !config.simulation.high_channels.is_empty() {
        debug!(
            "  simulated high channels: {:?}",
            config.simulation.high_channels
        );
    }
}
