//! In-process stand-ins for the rendering, media and network collaborators.
//!
//! They let the binary drive a full session from a script: the audio
//! engine answers start intents on the bus, media tracks can be declared
//! missing, and the transports log the payloads they would broadcast.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use hallway_common::{AudioEngineState, CoordinationError, Event, EventBus, TrackKind};
use hallway_social::protocol::{events, KnockPayload, PositionPayload};
use hallway_social::{
    AudioBackend, ChatMessage, ChatScope, ChatTransport, IcebreakerError, IcebreakerRequest,
    IcebreakerService, MediaTracks, ParticipantId, Position, PresenceTransport, Suggestion,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Audio engine
// ---------------------------------------------------------------------------

/// A scripted audio engine. `None` means the renderer has not built it.
pub struct SimAudio {
    state: Mutex<Option<AudioEngineState>>,
}

impl SimAudio {
    pub fn new(initial: Option<AudioEngineState>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(initial),
        })
    }

    /// Force the engine into `state` and announce it on the bus.
    pub fn report(&self, state: AudioEngineState, bus: &EventBus) {
        *guard(&self.state) = Some(state);
        bus.publish(Event::AudioStateChanged(state));
    }

    /// Answer start intents until the bus shuts down.
    pub fn listen(self: &Arc<Self>, bus: Arc<EventBus>) -> JoinHandle<()> {
        let audio = Arc::clone(self);
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(Event::StartAudio) => audio.start(&bus),
                    Ok(Event::Shutdown) | Err(broadcast::error::RecvError::Closed) => break,
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                }
            }
            debug!("simulated audio engine stopped");
        })
    }

    fn start(&self, bus: &EventBus) {
        let resumed = {
            let mut state = guard(&self.state);
            match *state {
                Some(AudioEngineState::Suspended) | Some(AudioEngineState::Interrupted) => {
                    *state = Some(AudioEngineState::Running);
                    true
                }
                _ => false,
            }
        };
        if resumed {
            info!("simulated audio engine resumed");
            bus.publish(Event::AudioStateChanged(AudioEngineState::Running));
        }
    }
}

impl AudioBackend for SimAudio {
    fn engine_state(&self) -> Option<AudioEngineState> {
        *guard(&self.state)
    }

    fn set_gain(&self, participant: &ParticipantId, gain: f64) {
        debug!(participant = %participant, gain, "voice gain");
    }
}

// ---------------------------------------------------------------------------
// Media tracks
// ---------------------------------------------------------------------------

/// Local media where some devices may be absent.
pub struct SimMedia {
    missing: Vec<TrackKind>,
}

impl SimMedia {
    pub fn new(missing: Vec<TrackKind>) -> Arc<Self> {
        Arc::new(Self { missing })
    }
}

impl MediaTracks for SimMedia {
    fn set_track_enabled(&self, kind: TrackKind, enabled: bool) -> Result<(), CoordinationError> {
        if enabled && self.missing.contains(&kind) {
            return Err(CoordinationError::DeviceUnavailable(kind));
        }
        debug!(track = %kind, enabled, "track toggled");
        Ok(())
    }

    fn release(&self) {
        debug!("local tracks released");
    }
}

// ---------------------------------------------------------------------------
// Transports
// ---------------------------------------------------------------------------

/// Logs every broadcast and keeps a record of `(event, payload)` pairs.
pub struct SimTransport {
    local: ParticipantId,
    sent: Mutex<Vec<(&'static str, String)>>,
}

impl SimTransport {
    pub fn new(local: ParticipantId) -> Arc<Self> {
        Arc::new(Self {
            local,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<(&'static str, String)> {
        guard(&self.sent).clone()
    }

    fn broadcast<T: serde::Serialize>(
        &self,
        event: &'static str,
        payload: &T,
    ) -> Result<(), CoordinationError> {
        let json = serde_json::to_string(payload)
            .map_err(|e| CoordinationError::Transport(e.to_string()))?;
        info!(event, payload = %json, "broadcast");
        guard(&self.sent).push((event, json));
        Ok(())
    }

    fn knock_payload(&self, to: &ParticipantId) -> KnockPayload {
        KnockPayload {
            from: self.local.clone(),
            to: to.clone(),
        }
    }
}

#[async_trait]
impl PresenceTransport for SimTransport {
    async fn publish_position(
        &self,
        participant: &ParticipantId,
        position: Position,
    ) -> Result<(), CoordinationError> {
        self.broadcast(
            events::POSITION_UPDATE,
            &PositionPayload {
                user_id: participant.clone(),
                position,
            },
        )
    }

    async fn send_knock(&self, to: &ParticipantId) -> Result<(), CoordinationError> {
        self.broadcast(events::KNOCK, &self.knock_payload(to))
    }

    async fn acknowledge_knock(&self, to: &ParticipantId) -> Result<(), CoordinationError> {
        self.broadcast(events::KNOCK_ACK, &self.knock_payload(to))
    }
}

#[async_trait]
impl ChatTransport for SimTransport {
    async fn post(&self, scope: &ChatScope, message: &ChatMessage) -> Result<(), CoordinationError> {
        debug!(scope = %scope, "chat post");
        self.broadcast(events::CHAT_MESSAGE, message)
    }
}

// ---------------------------------------------------------------------------
// Icebreakers
// ---------------------------------------------------------------------------

/// Replies with a fixed starter, or fails when there is none.
pub struct CannedIcebreaker {
    reply: Option<String>,
}

impl CannedIcebreaker {
    pub fn new(reply: Option<String>) -> Arc<Self> {
        Arc::new(Self { reply })
    }
}

#[async_trait]
impl IcebreakerService for CannedIcebreaker {
    async fn suggest(&self, request: &IcebreakerRequest) -> Result<Suggestion, IcebreakerError> {
        debug!(other = %request.other_user_context, "canned icebreaker");
        match &self.reply {
            Some(text) if !text.trim().is_empty() => Ok(Suggestion {
                conversation_starter: text.clone(),
            }),
            Some(_) => Err(IcebreakerError::Empty),
            None => Err(IcebreakerError::ApiError("no canned reply".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_device_fails_only_when_enabling() {
        let media = SimMedia::new(vec![TrackKind::Camera]);
        assert_eq!(
            media.set_track_enabled(TrackKind::Camera, true),
            Err(CoordinationError::DeviceUnavailable(TrackKind::Camera))
        );
        assert!(media.set_track_enabled(TrackKind::Camera, false).is_ok());
        assert!(media.set_track_enabled(TrackKind::Microphone, true).is_ok());
    }

    #[tokio::test]
    async fn engine_answers_start_intent() {
        let bus = Arc::new(EventBus::default());
        let audio = SimAudio::new(Some(AudioEngineState::Suspended));
        let mut rx = bus.subscribe();
        let task = audio.listen(Arc::clone(&bus));

        bus.publish(Event::StartAudio);
        loop {
            if let Event::AudioStateChanged(state) = rx.recv().await.unwrap() {
                assert_eq!(state, AudioEngineState::Running);
                break;
            }
        }
        assert_eq!(audio.engine_state(), Some(AudioEngineState::Running));

        bus.publish(Event::Shutdown);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn closed_engine_stays_closed() {
        let bus = Arc::new(EventBus::default());
        let audio = SimAudio::new(Some(AudioEngineState::Closed));
        audio.start(&bus);
        assert_eq!(audio.engine_state(), Some(AudioEngineState::Closed));
    }

    #[tokio::test]
    async fn transport_records_knocks() {
        let transport = SimTransport::new("alice".into());
        transport.send_knock(&"bob".into()).await.unwrap();
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, events::KNOCK);
        assert_eq!(sent[0].1, r#"{"from":"alice","to":"bob"}"#);
    }

    #[tokio::test]
    async fn canned_icebreaker_without_reply_fails() {
        let service = CannedIcebreaker::new(None);
        let result = service.suggest(&IcebreakerRequest::default()).await;
        assert!(matches!(result, Err(IcebreakerError::ApiError(_))));
    }
}
