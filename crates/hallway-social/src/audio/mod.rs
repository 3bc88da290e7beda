//! Audio engine lifecycle and spatial gain.
//!
//! The engine itself lives inside the rendering collaborator, which is the
//! only component allowed to touch the audio graph. This module asks for a
//! start through the intent bus, reflects the state the engine reports
//! (push notifications first, polling as the fallback), and forwards the
//! per-participant gains the coordinator computes.

mod lifecycle;
mod types;

pub use lifecycle::AudioLifecycle;
pub use types::{AudioBackend, AudioConfig, AudioTransition, StartRequest};
