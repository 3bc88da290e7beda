//! The single audio lifecycle object of a client session.

use std::collections::HashMap;
use std::sync::Arc;

use hallway_common::{AudioEngineState, CoordinationError, Event, EventBus};
use tracing::{debug, info, warn};

use crate::participant::ParticipantId;

use super::types::{AudioBackend, AudioConfig, AudioTransition, StartRequest};

/// Tracks the engine state and gates the start gesture.
///
/// Created in `Suspended`. `Closed` is absorbing: once observed, the
/// backend is never queried again and start requests fail with
/// [`CoordinationError::EngineClosed`].
pub struct AudioLifecycle {
    backend: Arc<dyn AudioBackend>,
    bus: Arc<EventBus>,
    config: AudioConfig,
    state: AudioEngineState,
    /// Last gain forwarded per remote participant.
    gains: HashMap<ParticipantId, f64>,
}

impl AudioLifecycle {
    pub fn new(backend: Arc<dyn AudioBackend>, bus: Arc<EventBus>, config: AudioConfig) -> Self {
        Self {
            backend,
            bus,
            config,
            state: AudioEngineState::Suspended,
            gains: HashMap::new(),
        }
    }

    pub fn state(&self) -> AudioEngineState {
        self.state
    }

    /// Handle the "enable audio" gesture.
    ///
    /// Publishes [`Event::StartAudio`] for the renderer; the resulting state
    /// arrives later through [`observe`](Self::observe).
    pub fn request_start(&mut self) -> Result<StartRequest, CoordinationError> {
        if self.state.is_terminal() {
            warn!("start requested on a closed audio engine; refresh required");
            return Err(CoordinationError::EngineClosed);
        }

        let Some(reported) = self.backend.engine_state() else {
            warn!("audio engine is not available yet");
            return Err(CoordinationError::EngineUnavailable);
        };
        self.observe(Some(reported));

        match self.state {
            AudioEngineState::Closed => Err(CoordinationError::EngineClosed),
            AudioEngineState::Running => {
                debug!("audio engine already running");
                Ok(StartRequest::AlreadyRunning)
            }
            AudioEngineState::Suspended | AudioEngineState::Interrupted => {
                let listeners = self.bus.publish(Event::StartAudio);
                if listeners == 0 {
                    warn!("start-audio intent published with no renderer listening");
                }
                info!(from = %self.state, "start-audio intent dispatched");
                Ok(StartRequest::Dispatched)
            }
        }
    }

    /// Reconcile with a state reported by the engine.
    ///
    /// `None` means the renderer has not built the engine yet and reads as
    /// `Suspended`. Reports after `Closed` are ignored.
    pub fn observe(&mut self, reported: Option<AudioEngineState>) -> Option<AudioTransition> {
        if self.state.is_terminal() {
            return None;
        }
        let next = reported.unwrap_or(AudioEngineState::Suspended);
        if next == self.state {
            return None;
        }

        let transition = AudioTransition {
            from: self.state,
            to: next,
        };
        self.state = next;
        info!(from = %transition.from, to = %transition.to, "audio engine state changed");

        if next.is_terminal() {
            self.gains.clear();
        }
        Some(transition)
    }

    /// Fallback reconciliation: read the backend directly.
    pub fn poll(&mut self) -> Option<AudioTransition> {
        if self.state.is_terminal() {
            return None;
        }
        let reported = self.backend.engine_state();
        self.observe(reported)
    }

    /// Map a distance to a gain and forward it. See [`apply_gain`](Self::apply_gain).
    pub fn apply_distance(&mut self, participant: &ParticipantId, distance: f64) -> Option<f64> {
        let gain = self.config.gain.gain_at(distance);
        self.apply_gain(participant, gain)
    }

    /// Forward a gain to the backend if it moved by at least `gain_epsilon`.
    ///
    /// Returns the gain that was applied, if any.
    pub fn apply_gain(&mut self, participant: &ParticipantId, gain: f64) -> Option<f64> {
        if self.state.is_terminal() {
            return None;
        }
        let gain = if gain.is_nan() { 0.0 } else { gain.clamp(0.0, 1.0) };
        if let Some(previous) = self.gains.get(participant) {
            if (previous - gain).abs() < self.config.gain_epsilon {
                return None;
            }
        }
        self.backend.set_gain(participant, gain);
        self.gains.insert(participant.clone(), gain);
        Some(gain)
    }

    /// Silence a participant who left and drop its cached gain.
    pub fn forget(&mut self, participant: &ParticipantId) {
        if self.gains.remove(participant).is_some() && !self.state.is_terminal() {
            self.backend.set_gain(participant, 0.0);
        }
    }

    /// Participants that currently have a gain applied.
    pub fn mixed_participants(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<_> = self.gains.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn gain_of(&self, participant: &ParticipantId) -> Option<f64> {
        self.gains.get(participant).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::spatial::GainCurve;

    #[derive(Default)]
    struct FakeBackend {
        state: Mutex<Option<AudioEngineState>>,
        queries: AtomicUsize,
        gains: Mutex<Vec<(ParticipantId, f64)>>,
    }

    impl FakeBackend {
        fn with_state(state: Option<AudioEngineState>) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(state),
                ..Default::default()
            })
        }

        fn set(&self, state: AudioEngineState) {
            *self.state.lock().unwrap() = Some(state);
        }
    }

    impl AudioBackend for FakeBackend {
        fn engine_state(&self) -> Option<AudioEngineState> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            *self.state.lock().unwrap()
        }

        fn set_gain(&self, participant: &ParticipantId, gain: f64) {
            self.gains.lock().unwrap().push((participant.clone(), gain));
        }
    }

    fn lifecycle(backend: Arc<FakeBackend>) -> (AudioLifecycle, Arc<EventBus>) {
        let bus = Arc::new(EventBus::new(16));
        let config = AudioConfig {
            gain: GainCurve {
                full_gain_within: 50.0,
                silent_beyond: 150.0,
                floor: 0.0,
            },
            gain_epsilon: 0.01,
        };
        (AudioLifecycle::new(backend, Arc::clone(&bus), config), bus)
    }

    #[test]
    fn starts_suspended() {
        let (audio, _) = lifecycle(FakeBackend::with_state(None));
        assert_eq!(audio.state(), AudioEngineState::Suspended);
    }

    #[test]
    fn start_dispatches_intent_without_changing_state() {
        let backend = FakeBackend::with_state(Some(AudioEngineState::Suspended));
        let (mut audio, bus) = lifecycle(Arc::clone(&backend));
        let mut rx = bus.subscribe();

        assert_eq!(audio.request_start(), Ok(StartRequest::Dispatched));
        assert!(matches!(rx.try_recv(), Ok(Event::StartAudio)));
        assert_eq!(audio.state(), AudioEngineState::Suspended);

        backend.set(AudioEngineState::Running);
        let t = audio.poll().unwrap();
        assert_eq!(t.from, AudioEngineState::Suspended);
        assert_eq!(t.to, AudioEngineState::Running);
    }

    #[test]
    fn start_without_engine_is_unavailable() {
        let (mut audio, bus) = lifecycle(FakeBackend::with_state(None));
        let mut rx = bus.subscribe();

        assert_eq!(
            audio.request_start(),
            Err(CoordinationError::EngineUnavailable)
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(audio.state(), AudioEngineState::Suspended);
    }

    #[test]
    fn start_when_running_is_a_no_op() {
        let (mut audio, bus) = lifecycle(FakeBackend::with_state(Some(AudioEngineState::Running)));
        let mut rx = bus.subscribe();

        assert_eq!(audio.request_start(), Ok(StartRequest::AlreadyRunning));
        assert!(rx.try_recv().is_err());
        assert_eq!(audio.state(), AudioEngineState::Running);
    }

    #[test]
    fn closed_is_absorbing_and_never_touches_engine() {
        let backend = FakeBackend::with_state(Some(AudioEngineState::Running));
        let (mut audio, bus) = lifecycle(Arc::clone(&backend));
        let mut rx = bus.subscribe();

        audio.observe(Some(AudioEngineState::Closed));
        let queries_before = backend.queries.load(Ordering::SeqCst);

        for _ in 0..3 {
            assert_eq!(audio.request_start(), Err(CoordinationError::EngineClosed));
        }
        assert!(audio.poll().is_none());
        assert!(audio.observe(Some(AudioEngineState::Running)).is_none());

        assert_eq!(audio.state(), AudioEngineState::Closed);
        assert_eq!(backend.queries.load(Ordering::SeqCst), queries_before);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn engine_may_suspend_and_resume_on_its_own() {
        let (mut audio, _) = lifecycle(FakeBackend::with_state(None));
        assert!(audio.observe(Some(AudioEngineState::Running)).is_some());
        assert!(audio.observe(Some(AudioEngineState::Suspended)).is_some());
        assert!(audio.observe(Some(AudioEngineState::Running)).is_some());
        assert!(audio.observe(Some(AudioEngineState::Running)).is_none());
    }

    #[test]
    fn interruption_is_reported() {
        let (mut audio, _) = lifecycle(FakeBackend::with_state(None));
        audio.observe(Some(AudioEngineState::Running));
        let t = audio.observe(Some(AudioEngineState::Interrupted)).unwrap();
        assert_eq!(t.to, AudioEngineState::Interrupted);
    }

    #[test]
    fn start_from_interrupted_dispatches() {
        let (mut audio, bus) =
            lifecycle(FakeBackend::with_state(Some(AudioEngineState::Interrupted)));
        let mut rx = bus.subscribe();
        assert_eq!(audio.request_start(), Ok(StartRequest::Dispatched));
        assert!(matches!(rx.try_recv(), Ok(Event::StartAudio)));
    }

    #[test]
    fn missing_engine_reads_as_suspended() {
        let (mut audio, _) = lifecycle(FakeBackend::with_state(None));
        audio.observe(Some(AudioEngineState::Running));
        let t = audio.observe(None).unwrap();
        assert_eq!(t.to, AudioEngineState::Suspended);
    }

    #[test]
    fn gain_is_forwarded_only_on_change() {
        let backend = FakeBackend::with_state(None);
        let (mut audio, _) = lifecycle(Arc::clone(&backend));
        let bob = ParticipantId::new("bob");

        assert_eq!(audio.apply_distance(&bob, 10.0), Some(1.0));
        assert_eq!(audio.apply_distance(&bob, 20.0), None);
        assert_eq!(audio.apply_distance(&bob, 100.0), Some(0.5));
        assert_eq!(backend.gains.lock().unwrap().len(), 2);

        audio.forget(&bob);
        assert_eq!(
            backend.gains.lock().unwrap().last(),
            Some(&(bob.clone(), 0.0))
        );
        assert!(audio.gain_of(&bob).is_none());
    }

    #[test]
    fn nan_distance_never_reaches_backend() {
        let backend = FakeBackend::with_state(None);
        let (mut audio, _) = lifecycle(Arc::clone(&backend));
        let bob = ParticipantId::new("bob");

        let gain = audio.apply_distance(&bob, f64::NAN).unwrap();
        assert!(gain.is_finite());
        assert!(backend.gains.lock().unwrap().iter().all(|(_, g)| g.is_finite()));
    }
}
