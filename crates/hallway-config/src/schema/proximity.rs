//! Proximity classification configuration.

use serde::{Deserialize, Serialize};

/// Hysteresis thresholds and tick rate for the proximity tracker.
///
/// Distances are in world units of the rendering collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// A far pair becomes near when its distance drops below this.
    pub near_threshold: f64,
    /// A near pair becomes far when its distance exceeds this.
    pub far_threshold: f64,
    /// Position tick interval in milliseconds (valid range: 16-5000).
    pub tick_interval_ms: u32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            near_threshold: 50.0,
            far_threshold: 70.0,
            tick_interval_ms: 100,
        }
    }
}
