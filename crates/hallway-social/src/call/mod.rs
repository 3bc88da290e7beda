//! Call session control.
//!
//! At most one call exists per client. The controller owns the call's
//! participant set and local media flags; actual media flows through the
//! [`MediaTracks`] collaborator, so this module only handles the
//! coordination layer.

mod controller;
mod types;

pub use controller::CallController;
pub use types::{CallConfig, CallEvent, CallSession, MediaTracks, Toggled};
