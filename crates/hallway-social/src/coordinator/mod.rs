//! Per-remote relationship state driven by proximity and gestures.
//!
//! The coordinator decides which affordances to show, when an icebreaker
//! may be requested, and when a call should be opened. It never opens a
//! call itself; it emits [`CoordinatorEvent::CallIntent`] and the session
//! hands that to the call controller.

mod manager;
mod types;

pub use manager::Coordinator;
pub use types::{CoordinatorEvent, RelationshipState};
