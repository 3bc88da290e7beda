//! Full configuration validation.
//!
//! Each section has its own check; this orchestrator calls them all and
//! collects every error into a single `ConfigError`.

mod helpers;
mod sections;

#[cfg(test)]
mod tests;

use crate::schema::HallwayConfig;
use hallway_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &HallwayConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_proximity(&mut errors, config);
    sections::validate_audio(&mut errors, config);
    sections::validate_chat(&mut errors, config);
    sections::validate_call(&mut errors, config);
    sections::validate_icebreaker(&mut errors, config);
    sections::validate_notifications(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
