//! Types, configuration, and events for call sessions.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use hallway_common::{CallId, CoordinationError, TrackKind};

use crate::participant::ParticipantId;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The single active call of a client.
#[derive(Debug, Clone)]
pub struct CallSession {
    pub id: CallId,
    /// Remote participants; the local participant is implicit.
    pub participants: BTreeSet<ParticipantId>,
    pub muted: bool,
    pub video_off: bool,
    pub screen_sharing: bool,
    pub started_at: DateTime<Utc>,
}

impl CallSession {
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participants.contains(id)
    }

    /// Remote participants plus the local one.
    pub fn size(&self) -> usize {
        self.participants.len() + 1
    }
}

/// Local media as exposed by the call collaborator.
pub trait MediaTracks: Send + Sync {
    /// Enable or disable one local track.
    fn set_track_enabled(&self, kind: TrackKind, enabled: bool) -> Result<(), CoordinationError>;

    /// Stop every local track. Must be safe to call repeatedly.
    fn release(&self);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events emitted by the call controller for the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    Opened {
        id: CallId,
        participants: Vec<ParticipantId>,
        muted: bool,
        video_off: bool,
    },
    MuteChanged {
        muted: bool,
    },
    VideoChanged {
        video_off: bool,
    },
    ScreenShareChanged {
        sharing: bool,
    },
    ParticipantJoined {
        id: ParticipantId,
    },
    ParticipantLeft {
        id: ParticipantId,
    },
    /// The call ended; `participants` were still in it at that point.
    Closed {
        id: CallId,
        participants: Vec<ParticipantId>,
    },
}

/// Result of a media toggle.
///
/// The flag always flips; `degraded` carries the collaborator failure, if
/// the track could not follow.
#[derive(Debug, Clone, PartialEq)]
pub struct Toggled {
    pub event: CallEvent,
    pub degraded: Option<CoordinationError>,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for calls.
#[derive(Debug, Clone)]
pub struct CallConfig {
    /// Maximum call size, the local participant included.
    pub max_participants: usize,
    pub start_muted: bool,
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
