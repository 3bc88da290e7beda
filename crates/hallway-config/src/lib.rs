//! Hallway configuration system.
//!
//! TOML-based configuration with full validation. All sections use
//! sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hallway_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{HallwayConfig, CONFIG_SCHEMA_VERSION};

use std::path::Path;

use hallway_common::ConfigError;

/// Load and validate config.
///
/// With `path` set, that file must exist. Otherwise `config.toml` is read
/// from the OS config directory, creating a documented default if missing.
pub fn load_config(path: Option<&Path>) -> Result<HallwayConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };

    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &HallwayConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let json = config_to_json(&HallwayConfig::default());
        assert!(json.contains("\"proximity\""));
        assert!(json.contains("\"audio\""));
        assert!(json.contains("\"chat\""));
        assert!(json.contains("\"call\""));
        assert!(json.contains("\"icebreaker\""));
        assert!(json.contains("\"notifications\""));
        assert!(json.contains("\"logging\""));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn load_config_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[proximity]
near_threshold = 90.0
far_threshold = 70.0
"#,
        )
        .unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_config_accepts_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[call]\nmax_participants = 4\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.call.max_participants, 4);
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let json = config_to_json(&HallwayConfig::default());
        let parsed: HallwayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.proximity.far_threshold, 70.0);
        assert_eq!(parsed.chat.max_message_length, 500);
    }
}
