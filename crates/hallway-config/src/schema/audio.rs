//! Spatial audio configuration types.

use serde::{Deserialize, Serialize};

/// Audio engine polling and distance-to-gain mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Fallback engine state poll interval in milliseconds (valid range: 50-10000).
    pub poll_interval_ms: u32,
    /// Remote voices are at full gain within this distance.
    pub full_gain_within: f64,
    /// Remote voices are at `gain_floor` beyond this distance.
    pub silent_beyond: f64,
    /// Lowest gain applied to a distant participant (0.0-1.0).
    pub gain_floor: f64,
    /// Gain changes smaller than this are not forwarded to the engine.
    pub gain_epsilon: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            full_gain_within: 50.0,
            silent_beyond: 300.0,
            gain_floor: 0.0,
            gain_epsilon: 0.01,
        }
    }
}
