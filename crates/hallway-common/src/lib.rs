pub mod errors;
pub mod events;
pub mod id;
pub mod notifications;
pub mod types;

pub use errors::{ConfigError, CoordinationError, HallwayError};
pub use events::{Event, EventBus};
pub use id::{new_id, CallId};
pub use notifications::{Notification, NotificationLevel, NotificationQueue};
pub use types::{AudioEngineState, TrackKind};

pub type Result<T> = std::result::Result<T, HallwayError>;
