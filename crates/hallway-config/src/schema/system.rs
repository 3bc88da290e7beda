//! System configuration types: notifications and logging.

use serde::{Deserialize, Serialize};

/// Transient notice queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Notices kept on screen at once (valid range: 1-64).
    pub capacity: u32,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { capacity: 16 }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// The `EnvFilter` directive for the hallway crates at this level.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Trace => "hallway=trace",
            Self::Debug => "hallway=debug",
            Self::Info => "hallway=info",
            Self::Warn => "hallway=warn",
            Self::Error => "hallway=error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
