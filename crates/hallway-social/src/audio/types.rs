//! Backend trait, configuration, and lifecycle results.

use hallway_common::AudioEngineState;

use crate::participant::ParticipantId;
use crate::spatial::GainCurve;

/// The audio engine as exposed by the rendering collaborator.
pub trait AudioBackend: Send + Sync {
    /// Current engine state, or `None` while the renderer has not built it.
    fn engine_state(&self) -> Option<AudioEngineState>;

    /// Apply a gain in `[0, 1]` to one remote participant's voice.
    fn set_gain(&self, participant: &ParticipantId, gain: f64);
}

/// Configuration for the audio lifecycle.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub gain: GainCurve,
    /// Gain changes smaller than this are not forwarded.
    pub gain_epsilon: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            gain: GainCurve::default(),
            gain_epsilon: 0.01,
        }
    }
}

/// Outcome of a successful start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRequest {
    /// The start intent was published; the state follows once the engine reports it.
    Dispatched,
    /// Nothing to do.
    AlreadyRunning,
}

/// A state change accepted by the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioTransition {
    pub from: AudioEngineState,
    pub to: AudioEngineState,
}
