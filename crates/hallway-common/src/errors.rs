use std::path::PathBuf;

use crate::types::TrackKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Every failure the coordinator can produce.
///
/// Failures from asynchronous collaborators are converted into one of
/// these at the call site; none of them is allowed to escape as a panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinationError {
    #[error("audio engine has not been constructed yet")]
    EngineUnavailable,

    #[error("audio engine is closed; refresh required")]
    EngineClosed,

    #[error("could not generate a suggestion: {0}")]
    SuggestionFailed(String),

    #[error("a suggestion is already being generated for {0}")]
    SuggestionPending(String),

    #[error("{0} is not nearby")]
    NotNearby(String),

    #[error("no pending knock from {0}")]
    NoPendingKnock(String),

    #[error("already in a call")]
    AlreadyInCall,

    #[error("not in a call")]
    NotInCall,

    #[error("a call needs at least one remote participant")]
    EmptyCall,

    #[error("call is full ({max} participants)")]
    CallFull { max: usize },

    #[error("{0} device unavailable")]
    DeviceUnavailable(TrackKind),

    #[error("message too long ({len} > {max} characters)")]
    MessageTooLong { len: usize, max: usize },

    #[error("message is empty")]
    MessageEmpty,

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl CoordinationError {
    /// Whether the failure should be shown to the user as a notice.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            Self::EngineUnavailable
                | Self::InvalidSnapshot(_)
                | Self::SuggestionPending(_)
                | Self::NoPendingKnock(_)
        )
    }

    /// Whether recovering from the failure needs a page reload.
    pub fn requires_reload(&self) -> bool {
        matches!(self, Self::EngineClosed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HallwayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Coordination(#[from] CoordinationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("scenario error: {0}")]
    Scenario(String),
}
