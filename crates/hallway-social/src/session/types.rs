//! Session configuration, gestures, outbound work and UI events.

use std::fmt;

use hallway_common::{AudioEngineState, Notification};
use serde::Deserialize;

use crate::audio::{AudioConfig, AudioTransition};
use crate::call::{CallConfig, CallEvent};
use crate::chat::{ChatConfig, ChatMessage, ChatScope};
use crate::coordinator::CoordinatorEvent;
use crate::icebreaker::IcebreakerRequest;
use crate::participant::{ParticipantId, Position};
use crate::proximity::ProximityEvent;
use crate::spatial::Thresholds;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The participant this client speaks for.
    pub local: ParticipantId,
    pub thresholds: Thresholds,
    pub audio: AudioConfig,
    pub call: CallConfig,
    pub chat: ChatConfig,
    /// What the local participant shares about themselves.
    pub user_context: String,
    pub notification_capacity: usize,
}

impl SessionConfig {
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            local: ParticipantId::new(local),
            thresholds: Thresholds::default(),
            audio: AudioConfig::default(),
            call: CallConfig::default(),
            chat: ChatConfig::default(),
            user_context: String::new(),
            notification_capacity: 16,
        }
    }
}

// ---------------------------------------------------------------------------
// Gestures
// ---------------------------------------------------------------------------

/// An explicit user action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum Gesture {
    EnableAudio,
    SuggestIcebreaker { remote: ParticipantId },
    Knock { remote: ParticipantId },
    AcceptKnock { remote: ParticipantId },
    ToggleMute,
    ToggleVideo,
    ToggleScreenShare,
    LeaveCall,
    PostChat { text: String },
    SetChatScope { scope: ChatScope },
    MoveTo { position: Position },
    Shutdown,
}

// ---------------------------------------------------------------------------
// Outbound work
// ---------------------------------------------------------------------------

/// Asynchronous work the session asks its owner to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    RequestIcebreaker {
        remote: ParticipantId,
        request: IcebreakerRequest,
    },
    SendKnock {
        to: ParticipantId,
    },
    AcknowledgeKnock {
        to: ParticipantId,
    },
    PostChat {
        message: ChatMessage,
    },
    PublishPosition {
        position: Position,
    },
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Everything the UI needs to know about.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Proximity(ProximityEvent),
    Coordinator(CoordinatorEvent),
    Call(CallEvent),
    Audio(AudioTransition),
    /// The start intent went out; the engine state follows separately.
    StartAudioRequested,
    GainChanged {
        participant: ParticipantId,
        gain: f64,
    },
    ChatMessage(ChatMessage),
    ChatScopeChanged(ChatScope),
    Notice(Notification),
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proximity(ProximityEvent::Enter { pair, distance }) => {
                write!(f, "proximity enter {pair} at {distance:.1}")
            }
            Self::Proximity(ProximityEvent::Exit { pair, reason }) => {
                write!(f, "proximity exit {pair} ({reason:?})")
            }
            Self::Coordinator(event) => match event {
                CoordinatorEvent::StateChanged { remote, from, to } => {
                    write!(f, "{remote}: {from} -> {to}")
                }
                CoordinatorEvent::AffordanceShown { remote } => {
                    write!(f, "{remote}: show Knock / Suggest Icebreaker")
                }
                CoordinatorEvent::AffordanceHidden { remote } => write!(f, "{remote}: hide affordances"),
                CoordinatorEvent::IcebreakerSuggested { remote, text } => {
                    write!(f, "{remote}: icebreaker \"{text}\"")
                }
                CoordinatorEvent::KnockSent { remote } => write!(f, "knocked on {remote}"),
                CoordinatorEvent::KnockReceived { remote } => write!(f, "{remote} is knocking"),
                CoordinatorEvent::CallIntent { remotes } => {
                    write!(f, "call requested with {}", join(remotes))
                }
            },
            Self::Call(event) => match event {
                CallEvent::Opened { id, participants, .. } => {
                    write!(f, "call {id} opened with {}", join(participants))
                }
                CallEvent::MuteChanged { muted } => write!(f, "muted: {muted}"),
                CallEvent::VideoChanged { video_off } => write!(f, "video off: {video_off}"),
                CallEvent::ScreenShareChanged { sharing } => write!(f, "screen sharing: {sharing}"),
                CallEvent::ParticipantJoined { id } => write!(f, "{id} joined the call"),
                CallEvent::ParticipantLeft { id } => write!(f, "{id} left the call"),
                CallEvent::Closed { id, .. } => write!(f, "call {id} closed"),
            },
            Self::Audio(t) => write!(f, "audio {} -> {}", t.from, t.to),
            Self::StartAudioRequested => f.write_str("start-audio requested"),
            Self::GainChanged { participant, gain } => write!(f, "gain {participant} = {gain:.2}"),
            Self::ChatMessage(m) => write!(f, "[{}] {}: {}", m.scope, m.author.label(), m.text),
            Self::ChatScopeChanged(scope) => write!(f, "chat scope {scope}"),
            Self::Notice(n) => write!(f, "notice {:?}: {} - {}", n.level, n.title, n.body),
        }
    }
}

fn join(ids: &[ParticipantId]) -> String {
    ids.iter()
        .map(ParticipantId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl SessionEvent {
    /// The notice carried by this event, if any.
    pub fn notice(&self) -> Option<&Notification> {
        match self {
            Self::Notice(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_audio_state(&self, state: AudioEngineState) -> bool {
        matches!(self, Self::Audio(t) if t.to == state)
    }
}
