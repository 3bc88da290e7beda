//! The client session: every component wired together, plus the task that
//! drives it.

mod facade;
mod runtime;
mod types;

pub use facade::Session;
pub use runtime::{Collaborators, SessionHandle, SessionRuntime};
pub use types::{Gesture, Outbound, SessionConfig, SessionEvent};
