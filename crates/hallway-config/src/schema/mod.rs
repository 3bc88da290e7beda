//! Configuration schema types for Hallway.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod audio;
mod chat;
mod icebreaker;
mod proximity;
mod system;

pub use audio::*;
pub use chat::*;
pub use icebreaker::*;
pub use proximity::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Hallway.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct HallwayConfig {
    pub proximity: ProximityConfig,
    pub audio: AudioConfig,
    pub chat: ChatConfig,
    pub call: CallConfig,
    pub icebreaker: IcebreakerConfig,
    pub notifications: NotificationsConfig,
    pub logging: LoggingConfig,
}
