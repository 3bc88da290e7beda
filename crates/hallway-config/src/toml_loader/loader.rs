//! Reading a config file into a [`HallwayConfig`].

use std::io::ErrorKind;
use std::path::Path;

use hallway_common::ConfigError;
use tracing::{debug, info, warn};

use super::paths::{create_default_config, default_config_path};
use crate::schema::HallwayConfig;
use crate::validation;

/// Parse the TOML file at `path`; absent keys take their defaults.
///
/// Out-of-range values are logged, not rejected: the parsed config is
/// returned as written. [`crate::load_config`] is the validating entry point.
pub fn load_from_path(path: &Path) -> Result<HallwayConfig, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };

    let config = parse(&text).map_err(|e| match e {
        ConfigError::ParseError(msg) => {
            ConfigError::ParseError(format!("{}: {msg}", path.display()))
        }
        other => other,
    })?;

    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), error = %e, "config has out-of-range values");
    }
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Parse config text.
pub fn parse(text: &str) -> Result<HallwayConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError(e.message().to_string()))
}

/// Load from [`default_config_path`], writing the default file on first run.
pub fn load_default() -> Result<HallwayConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            debug!(path = %path.display(), "first run; no config yet");
            create_default_config(&path)?;
            Ok(HallwayConfig::default())
        }
        result => result,
    }
}
