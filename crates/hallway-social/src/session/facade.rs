//! The session façade: one instance of every component, wired together.

use std::collections::HashSet;
use std::sync::Arc;

use hallway_common::{
    AudioEngineState, CoordinationError, EventBus, Notification, NotificationQueue,
};
use tracing::{debug, info, warn};

use crate::audio::{AudioBackend, AudioLifecycle, AudioTransition, StartRequest};
use crate::call::{CallController, CallEvent, MediaTracks, Toggled};
use crate::chat::{Author, ChatBook, ChatScope};
use crate::coordinator::{Coordinator, CoordinatorEvent, RelationshipState};
use crate::icebreaker::Suggestion;
use crate::participant::{ParticipantId, Snapshot};
use crate::protocol::InboundEvent;
use crate::proximity::{ProximityBatch, ProximityEvent, ProximityTracker};
use crate::spatial::distance;

use super::types::{Gesture, Outbound, SessionConfig, SessionEvent};

/// Owns the tracker, coordinator, audio lifecycle, call controller and chat
/// for one client, and is the only place where they meet.
///
/// Every method is synchronous and returns the events it produced. Work that
/// needs a collaborator is queued and collected with
/// [`take_outbound`](Self::take_outbound).
pub struct Session {
    local: ParticipantId,
    tracker: ProximityTracker,
    coordinator: Coordinator,
    audio: AudioLifecycle,
    calls: CallController,
    chat: ChatBook,
    notices: NotificationQueue,
    snapshot: Snapshot,
    outbound: Vec<Outbound>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        backend: Arc<dyn AudioBackend>,
        media: Arc<dyn MediaTracks>,
        bus: Arc<EventBus>,
    ) -> Self {
        info!(local = %config.local, "session created");
        Self {
            tracker: ProximityTracker::new(config.thresholds),
            coordinator: Coordinator::new(config.local.clone(), config.user_context),
            audio: AudioLifecycle::new(backend, bus, config.audio),
            calls: CallController::new(config.call, media),
            chat: ChatBook::new(config.chat),
            notices: NotificationQueue::new(config.notification_capacity),
            snapshot: Snapshot::default(),
            outbound: Vec::new(),
            local: config.local,
        }
    }

    // -- accessors --

    pub fn local(&self) -> &ParticipantId {
        &self.local
    }

    pub fn tracker(&self) -> &ProximityTracker {
        &self.tracker
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn audio_state(&self) -> AudioEngineState {
        self.audio.state()
    }

    pub fn calls(&self) -> &CallController {
        &self.calls
    }

    pub fn chat(&self) -> &ChatBook {
        &self.chat
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn relationship(&self, remote: &ParticipantId) -> RelationshipState {
        self.coordinator.state(remote)
    }

    /// Notices that have not expired yet.
    pub fn notices(&mut self) -> Vec<&Notification> {
        self.notices.visible()
    }

    /// Drain the collaborator work queued so far.
    pub fn take_outbound(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbound)
    }

    // -- ticks --

    /// Process one presence snapshot.
    pub fn tick(&mut self, snapshot: Snapshot) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        let batch = self.tracker.apply(&snapshot);
        self.snapshot = snapshot;

        for event in &batch.events {
            if !event.pair().contains(&self.local) {
                continue;
            }
            out.push(SessionEvent::Proximity(event.clone()));
            let changed = match event {
                ProximityEvent::Enter { pair, .. } => self.chat.pair_entered(pair),
                ProximityEvent::Exit { pair, .. } => self.chat.pair_exited(pair),
            };
            if changed {
                out.push(SessionEvent::ChatScopeChanged(self.chat.active().clone()));
            }
        }

        let events = self.coordinator.handle_batch(&batch);
        self.absorb(events, &mut out);
        self.update_gains(&mut out);
        out
    }

    /// A state report pushed by the audio engine.
    pub fn audio_reported(&mut self, state: Option<AudioEngineState>) -> Vec<SessionEvent> {
        let transition = self.audio.observe(state);
        self.audio_transition(transition)
    }

    /// Fallback reconciliation with the audio engine.
    pub fn poll_audio(&mut self) -> Vec<SessionEvent> {
        let transition = self.audio.poll();
        self.audio_transition(transition)
    }

    // -- gestures --

    pub fn gesture(&mut self, gesture: Gesture) -> Vec<SessionEvent> {
        debug!(?gesture, "gesture");
        match gesture {
            Gesture::EnableAudio => self.enable_audio(),
            Gesture::SuggestIcebreaker { remote } => self.suggest_icebreaker(&remote),
            Gesture::Knock { remote } => self.knock(&remote),
            Gesture::AcceptKnock { remote } => self.accept_knock(&remote),
            Gesture::ToggleMute => self.toggle(CallController::toggle_mute),
            Gesture::ToggleVideo => self.toggle(CallController::toggle_video),
            Gesture::ToggleScreenShare => self.toggle(CallController::toggle_screen_share),
            Gesture::LeaveCall => self.leave_call(),
            Gesture::PostChat { text } => self.post_chat(&text),
            Gesture::SetChatScope { scope } => self.set_chat_scope(scope),
            Gesture::MoveTo { position } => {
                self.outbound.push(Outbound::PublishPosition { position });
                Vec::new()
            }
            Gesture::Shutdown => self.shutdown(),
        }
    }

    pub fn enable_audio(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        match self.audio.request_start() {
            Ok(StartRequest::Dispatched) => out.push(SessionEvent::StartAudioRequested),
            Ok(StartRequest::AlreadyRunning) => {}
            Err(e) => self.fail(e, &mut out),
        }
        out
    }

    pub fn suggest_icebreaker(&mut self, remote: &ParticipantId) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        let other_context = self
            .snapshot
            .get(remote)
            .map(|p| p.context.clone())
            .unwrap_or_default();
        match self.coordinator.begin_icebreaker(remote, &other_context) {
            Ok(request) => self.outbound.push(Outbound::RequestIcebreaker {
                remote: remote.clone(),
                request,
            }),
            Err(e) => self.fail(e, &mut out),
        }
        out
    }

    /// Deliver the result of an icebreaker request.
    pub fn icebreaker_resolved(
        &mut self,
        remote: &ParticipantId,
        result: Result<Suggestion, CoordinationError>,
    ) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        match self.coordinator.resolve_icebreaker(remote, result) {
            Ok(events) => self.absorb(events, &mut out),
            Err(e) => self.fail(e, &mut out),
        }
        out
    }

    pub fn knock(&mut self, remote: &ParticipantId) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        match self.coordinator.knock(remote) {
            Ok(event) => {
                self.outbound.push(Outbound::SendKnock { to: remote.clone() });
                out.push(SessionEvent::Coordinator(event));
            }
            Err(e) => self.fail(e, &mut out),
        }
        out
    }

    pub fn accept_knock(&mut self, remote: &ParticipantId) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        match self.coordinator.accept_knock(remote) {
            Ok(events) => {
                self.outbound
                    .push(Outbound::AcknowledgeKnock { to: remote.clone() });
                self.absorb(events, &mut out);
            }
            Err(e) => self.fail(e, &mut out),
        }
        out
    }

    pub fn leave_call(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        if let Some(closed) = self.calls.leave() {
            self.call_events(vec![closed], &mut out);
        }
        out
    }

    pub fn post_chat(&mut self, text: &str) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        match self.chat.post(Author::Local, text) {
            Ok(message) => {
                self.outbound.push(Outbound::PostChat {
                    message: message.clone(),
                });
                out.push(SessionEvent::ChatMessage(message));
            }
            Err(e) => self.fail(e, &mut out),
        }
        out
    }

    pub fn set_chat_scope(&mut self, scope: ChatScope) -> Vec<SessionEvent> {
        if self.chat.set_active(scope) {
            vec![SessionEvent::ChatScopeChanged(self.chat.active().clone())]
        } else {
            Vec::new()
        }
    }

    /// Leave any call and drop every tracked pair.
    pub fn shutdown(&mut self) -> Vec<SessionEvent> {
        let mut out = self.leave_call();
        let batch = ProximityBatch {
            tick: self.tracker.tick(),
            events: self.tracker.clear(),
            unchanged: 0,
        };
        for event in &batch.events {
            if event.pair().contains(&self.local) {
                out.push(SessionEvent::Proximity(event.clone()));
                self.chat.pair_exited(event.pair());
            }
        }
        let events = self.coordinator.handle_batch(&batch);
        self.absorb(events, &mut out);
        for id in self.audio.mixed_participants() {
            self.audio.forget(&id);
        }
        info!(local = %self.local, "session shut down");
        out
    }

    // -- inbound --

    pub fn inbound(&mut self, event: InboundEvent) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        match event {
            InboundEvent::KnockReceived { from } => {
                let events = self.coordinator.knock_received(&from);
                self.absorb(events, &mut out);
            }
            InboundEvent::KnockAcknowledged { from } => {
                let events = self.coordinator.knock_acknowledged(&from);
                self.absorb(events, &mut out);
            }
            InboundEvent::ChatMessage { message } => {
                if self.chat.deliver(message.clone()) {
                    out.push(SessionEvent::ChatMessage(message));
                }
            }
            InboundEvent::CallParticipantJoined { id } => {
                match self.calls.participant_joined(id.clone()) {
                    Ok(Some(event)) => {
                        out.push(SessionEvent::Call(event));
                        let events = self.coordinator.joined_call(&id);
                        out.extend(events.into_iter().map(SessionEvent::Coordinator));
                    }
                    Ok(None) => {}
                    Err(e) => self.fail(e, &mut out),
                }
            }
            InboundEvent::CallParticipantLeft { id } => {
                let events = self.calls.participant_left(&id);
                self.call_events(events, &mut out);
            }
        }
        out
    }

    /// A collaborator call failed after the fact.
    pub fn report_failure(&mut self, error: CoordinationError) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        self.fail(error, &mut out);
        out
    }

    // -- internals --

    fn toggle(
        &mut self,
        op: fn(&mut CallController) -> Result<Toggled, CoordinationError>,
    ) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        match op(&mut self.calls) {
            Ok(toggled) => {
                out.push(SessionEvent::Call(toggled.event));
                if let Some(e) = toggled.degraded {
                    self.fail(e, &mut out);
                }
            }
            Err(e) => self.fail(e, &mut out),
        }
        out
    }

    /// Forward coordinator events, realising call intents on the way.
    fn absorb(&mut self, events: Vec<CoordinatorEvent>, out: &mut Vec<SessionEvent>) {
        for event in events {
            let intent = match &event {
                CoordinatorEvent::CallIntent { remotes } => Some(remotes.clone()),
                _ => None,
            };
            out.push(SessionEvent::Coordinator(event));

            let Some(remotes) = intent else { continue };
            match self.calls.open(remotes.iter().cloned()) {
                Ok(opened) => out.push(SessionEvent::Call(opened)),
                Err(e) => {
                    let reverted = self.coordinator.call_rejected(&remotes);
                    out.extend(reverted.into_iter().map(SessionEvent::Coordinator));
                    self.fail(e, out);
                }
            }
        }
    }

    /// Forward call events and let the coordinator know who left.
    fn call_events(&mut self, events: Vec<CallEvent>, out: &mut Vec<SessionEvent>) {
        for event in events {
            let ended = match &event {
                CallEvent::ParticipantLeft { id } => vec![id.clone()],
                CallEvent::Closed { participants, .. } => participants.clone(),
                _ => Vec::new(),
            };
            out.push(SessionEvent::Call(event));
            let reverted = self.coordinator.call_ended(&ended);
            out.extend(reverted.into_iter().map(SessionEvent::Coordinator));
        }
    }

    fn audio_transition(&mut self, transition: Option<AudioTransition>) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        let Some(transition) = transition else {
            return out;
        };
        out.push(SessionEvent::Audio(transition));
        if transition.to == AudioEngineState::Closed {
            self.fail(CoordinationError::EngineClosed, &mut out);
        }
        out
    }

    /// Map every online remote's distance to a gain.
    fn update_gains(&mut self, out: &mut Vec<SessionEvent>) {
        let local = self
            .snapshot
            .get(&self.local)
            .filter(|p| p.online)
            .map(|p| p.position);

        let mut audible = HashSet::new();
        if let Some(origin) = local {
            for remote in self.snapshot.online().filter(|p| p.id != self.local) {
                audible.insert(remote.id.clone());
                let d = distance(origin, remote.position);
                if let Some(gain) = self.audio.apply_distance(&remote.id, d) {
                    out.push(SessionEvent::GainChanged {
                        participant: remote.id.clone(),
                        gain,
                    });
                }
            }
        }

        for id in self.audio.mixed_participants() {
            if !audible.contains(&id) {
                self.audio.forget(&id);
                out.push(SessionEvent::GainChanged {
                    participant: id,
                    gain: 0.0,
                });
            }
        }
    }

    fn fail(&mut self, error: CoordinationError, out: &mut Vec<SessionEvent>) {
        if !error.is_user_visible() {
            debug!(%error, "coordination failure not surfaced");
            return;
        }
        warn!(%error, "coordination failure");
        let notice = Notification::from_error(&error);
        self.notices.push(notice.clone());
        out.push(SessionEvent::Notice(notice));
    }
}
