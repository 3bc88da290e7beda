//! Participants and the per-tick presence snapshot.
//!
//! The presence transport owns participants; the coordinator only ever
//! sees a whole [`Snapshot`] at a time and replaces it wholesale on the
//! next tick.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use hallway_common::CoordinationError;
use serde::{Deserialize, Serialize};

/// Stable identifier of a participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A point in the shared 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// One participant as seen in a single tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub position: Position,
    /// What the participant shares about themselves; feeds icebreakers.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,
    #[serde(default = "default_online")]
    pub online: bool,
}

fn default_online() -> bool {
    true
}

impl Participant {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: ParticipantId::new(id),
            display_name: display_name.into(),
            email: None,
            position: Position::new(x, y),
            context: String::new(),
            online: true,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn offline(mut self) -> Self {
        self.online = false;
        self
    }
}

/// An immutable, internally consistent set of participants for one tick.
///
/// Cloning is cheap; the participant list is shared.
#[derive(Debug, Clone)]
pub struct Snapshot {
    participants: Arc<[Participant]>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            participants: Arc::from(Vec::new()),
        }
    }
}

impl Snapshot {
    /// Build a snapshot, rejecting duplicate participant ids.
    pub fn new(participants: Vec<Participant>) -> Result<Self, CoordinationError> {
        {
            let mut seen = HashSet::with_capacity(participants.len());
            if let Some(dup) = participants.iter().find(|p| !seen.insert(&p.id)) {
                return Err(CoordinationError::InvalidSnapshot(format!(
                    "duplicate participant {}",
                    dup.id
                )));
            }
        }
        Ok(Self {
            participants: participants.into(),
        })
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn online(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.online)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
