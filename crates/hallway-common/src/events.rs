//! Intent bus shared with the rendering collaborator.
//!
//! The scene is the only component allowed to touch the audio graph, so
//! the coordinator asks for a start by publishing [`Event::StartAudio`]
//! and learns about engine changes from [`Event::AudioStateChanged`].

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::AudioEngineState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A user gesture asked for audio output to start.
    StartAudio,
    /// The engine reported a new state.
    AudioStateChanged(AudioEngineState),
    Shutdown,
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
