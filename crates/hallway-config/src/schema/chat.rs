//! Chat and call configuration types.

use serde::{Deserialize, Serialize};

/// Chat channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Longest accepted message, in characters (valid range: 1-5000).
    pub max_message_length: u32,
    /// Switch to the proximity channel automatically when someone comes near.
    pub follow_proximity: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: 500,
            follow_proximity: true,
        }
    }
}

/// Call session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    /// Maximum participants per call, including the local one (valid range: 2-32).
    pub max_participants: u32,
    /// Start calls with the microphone muted.
    pub start_muted: bool,
    /// Start calls with the camera off.
    pub start_video_off: bool,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            max_participants: 8,
            start_muted: false,
            start_video_off: false,
        }
    }
}
