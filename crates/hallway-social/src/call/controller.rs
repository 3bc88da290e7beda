//! CallController: opens, toggles and tears down the single call session.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use hallway_common::{CallId, CoordinationError, TrackKind};
use tracing::{debug, info, warn};

use crate::participant::ParticipantId;

use super::types::{CallConfig, CallEvent, CallSession, MediaTracks, Toggled};

/// Manages the single call session and its local media flags.
pub struct CallController {
    config: CallConfig,
    media: Arc<dyn MediaTracks>,
    session: Option<CallSession>,
}

impl CallController {
    pub fn new(config: CallConfig, media: Arc<dyn MediaTracks>) -> Self {
        Self {
            config,
            media,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&CallSession> {
        self.session.as_ref()
    }

    pub fn in_call(&self) -> bool {
        self.session.is_some()
    }

    /// Open a call with the given remote participants.
    pub fn open(
        &mut self,
        participants: impl IntoIterator<Item = ParticipantId>,
    ) -> Result<CallEvent, CoordinationError> {
        if self.session.is_some() {
            return Err(CoordinationError::AlreadyInCall);
        }

        let participants: BTreeSet<ParticipantId> = participants.into_iter().collect();
        if participants.is_empty() {
            return Err(CoordinationError::EmptyCall);
        }
        if participants.len() + 1 > self.config.max_participants {
            return Err(CoordinationError::CallFull {
                max: self.config.max_participants,
            });
        }

        let session = CallSession {
            id: CallId::new(),
            participants,
            muted: self.config.start_muted,
            video_off: self.config.start_video_off,
            screen_sharing: false,
            started_at: Utc::now(),
        };
        let event = CallEvent::Opened {
            id: session.id.clone(),
            participants: session.participants.iter().cloned().collect(),
            muted: session.muted,
            video_off: session.video_off,
        };
        info!(call_id = %session.id, size = session.size(), "call opened");
        self.session = Some(session);
        Ok(event)
    }

    pub fn toggle_mute(&mut self) -> Result<Toggled, CoordinationError> {
        let session = self.session.as_mut().ok_or(CoordinationError::NotInCall)?;
        session.muted = !session.muted;
        let muted = session.muted;
        let degraded = self.apply_track(TrackKind::Microphone, !muted);
        Ok(Toggled {
            event: CallEvent::MuteChanged { muted },
            degraded,
        })
    }

    pub fn toggle_video(&mut self) -> Result<Toggled, CoordinationError> {
        let session = self.session.as_mut().ok_or(CoordinationError::NotInCall)?;
        session.video_off = !session.video_off;
        let video_off = session.video_off;
        let degraded = self.apply_track(TrackKind::Camera, !video_off);
        Ok(Toggled {
            event: CallEvent::VideoChanged { video_off },
            degraded,
        })
    }

    pub fn toggle_screen_share(&mut self) -> Result<Toggled, CoordinationError> {
        let session = self.session.as_mut().ok_or(CoordinationError::NotInCall)?;
        session.screen_sharing = !session.screen_sharing;
        let sharing = session.screen_sharing;
        let degraded = self.apply_track(TrackKind::Screen, sharing);
        Ok(Toggled {
            event: CallEvent::ScreenShareChanged { sharing },
            degraded,
        })
    }

    /// Tear down the call. A no-op without one.
    pub fn leave(&mut self) -> Option<CallEvent> {
        let session = self.session.take()?;
        self.media.release();
        info!(call_id = %session.id, "left call");
        Some(CallEvent::Closed {
            id: session.id,
            participants: session.participants.into_iter().collect(),
        })
    }

    /// A remote participant joined the call.
    ///
    /// Returns `None` when the participant was already in it.
    pub fn participant_joined(
        &mut self,
        id: ParticipantId,
    ) -> Result<Option<CallEvent>, CoordinationError> {
        let max = self.config.max_participants;
        let session = self.session.as_mut().ok_or(CoordinationError::NotInCall)?;
        if session.contains(&id) {
            return Ok(None);
        }
        if session.size() >= max {
            return Err(CoordinationError::CallFull { max });
        }
        debug!(call_id = %session.id, participant = %id, "participant joined call");
        session.participants.insert(id.clone());
        Ok(Some(CallEvent::ParticipantJoined { id }))
    }

    /// A remote participant left or disconnected.
    ///
    /// Ends the call when nobody remains. Unknown participants are ignored.
    pub fn participant_left(&mut self, id: &ParticipantId) -> Vec<CallEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if !session.participants.remove(id) {
            return Vec::new();
        }
        debug!(call_id = %session.id, participant = %id, "participant left call");

        let mut events = vec![CallEvent::ParticipantLeft { id: id.clone() }];
        if session.participants.is_empty() {
            info!(call_id = %session.id, "call ended, no remote participants left");
            if let Some(closed) = self.leave() {
                events.push(closed);
            }
        }
        events
    }

    fn apply_track(&self, kind: TrackKind, enabled: bool) -> Option<CoordinationError> {
        match self.media.set_track_enabled(kind, enabled) {
            Ok(()) => None,
            Err(e) => {
                warn!(track = %kind, enabled, error = %e, "media track did not follow toggle");
                Some(e)
            }
        }
    }
}
