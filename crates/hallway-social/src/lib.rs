//! Proximity-driven presence and communication coordination.
//!
//! Positions come in as whole [`Snapshot`]s; the [`ProximityTracker`] turns
//! them into enter/exit events, the [`Coordinator`] turns those and user
//! gestures into affordances and call intents, and the [`Session`] ties in
//! audio, calls and chat.

pub mod audio;
pub mod call;
pub mod chat;
pub mod coordinator;
pub mod icebreaker;
pub mod participant;
pub mod protocol;
pub mod proximity;
pub mod roster;
pub mod session;
pub mod spatial;
pub mod transport;

pub use audio::{AudioBackend, AudioConfig, AudioLifecycle, AudioTransition, StartRequest};
pub use call::{CallConfig, CallController, CallEvent, CallSession, MediaTracks, Toggled};
pub use chat::{Author, ChatBook, ChatChannel, ChatConfig, ChatMessage, ChatScope};
pub use coordinator::{Coordinator, CoordinatorEvent, RelationshipState};
pub use icebreaker::{
    HttpIcebreakerClient, HttpIcebreakerConfig, IcebreakerError, IcebreakerRequest,
    IcebreakerService, Suggestion,
};
pub use participant::{Participant, ParticipantId, Position, Snapshot};
pub use protocol::{InboundEvent, KnockPayload, PositionPayload};
pub use proximity::{ExitReason, PairKey, ProximityBatch, ProximityEvent, ProximityTracker};
pub use roster::{sorted_roster, RosterEntry};
pub use session::{
    Collaborators, Gesture, Outbound, Session, SessionConfig, SessionEvent, SessionHandle,
    SessionRuntime,
};
pub use spatial::{GainCurve, Proximity, Thresholds};
pub use transport::{ChatTransport, PresenceTransport};
