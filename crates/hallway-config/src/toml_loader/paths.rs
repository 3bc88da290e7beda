//! Where the config file lives, and writing the documented default.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use hallway_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV: &str = "HALLWAY_CONFIG";

/// `$HALLWAY_CONFIG` if set, else `<config dir>/hallway/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    resolve_config_path(std::env::var_os(CONFIG_ENV), dirs::config_dir())
}

pub(super) fn resolve_config_path(
    explicit: Option<OsString>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    config_dir
        .map(|dir| dir.join("hallway").join("config.toml"))
        .ok_or_else(|| ConfigError::ParseError("no config directory on this platform".into()))
}

/// Write the commented default config to `path`.
///
/// The file is written next to its destination first and renamed into
/// place, so a crash never leaves a half-written config behind.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_err = |action: &str, target: &Path, e: std::io::Error| {
        ConfigError::ParseError(format!("{action} {}: {e}", target.display()))
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err("cannot create", parent, e))?;
    }

    let staging = path.with_extension("toml.new");
    std::fs::write(&staging, default_config_toml())
        .map_err(|e| io_err("cannot write", &staging, e))?;
    std::fs::rename(&staging, path).map_err(|e| io_err("cannot install", path, e))?;

    info!(path = %path.display(), "wrote default config");
    Ok(())
}
