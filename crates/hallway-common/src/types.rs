use std::fmt;

use serde::{Deserialize, Serialize};

/// State of the local client's audio engine.
///
/// Mirrors the states a browser audio context can report. `Closed` is
/// terminal: a closed engine cannot be resumed without a reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioEngineState {
    #[default]
    Suspended,
    Running,
    Closed,
    Interrupted,
}

impl AudioEngineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Suspended => "suspended",
            Self::Running => "running",
            Self::Closed => "closed",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for AudioEngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A local media track controlled during a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Microphone,
    Camera,
    Screen,
}

impl TrackKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Microphone => "microphone",
            Self::Camera => "camera",
            Self::Screen => "screen",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
