//! Icebreaker suggestion service configuration.

use serde::{Deserialize, Serialize};

/// Where conversation starters come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IcebreakerConfig {
    pub enabled: bool,
    /// HTTP endpoint accepting `{userContext, otherUserContext}`.
    pub endpoint: String,
    /// Environment variable holding the bearer token, if any.
    pub api_key_env: String,
    /// Request timeout in seconds (valid range: 1-120).
    pub timeout_secs: u32,
    /// Short description of the local user sent as context.
    pub user_context: String,
}

impl Default for IcebreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: String::new(),
            api_key_env: "HALLWAY_ICEBREAKER_KEY".into(),
            timeout_secs: 20,
            user_context: String::new(),
        }
    }
}
