//! Pair keys, tracked pairs, and the events a tick produces.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;
use crate::spatial::Proximity;

/// Normalised key for an unordered participant pair (`a < b`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    a: ParticipantId,
    b: ParticipantId,
}

impl PairKey {
    pub fn new(x: ParticipantId, y: ParticipantId) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    pub fn a(&self) -> &ParticipantId {
        &self.a
    }

    pub fn b(&self) -> &ParticipantId {
        &self.b
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        &self.a == id || &self.b == id
    }

    /// The member that is not `id`, if `id` is part of the pair.
    pub fn other(&self, id: &ParticipantId) -> Option<&ParticipantId> {
        if &self.a == id {
            Some(&self.b)
        } else if &self.b == id {
            Some(&self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.a, self.b)
    }
}

/// A pair currently classified as near.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityPair {
    pub key: PairKey,
    /// Distance at the last tick that evaluated the pair.
    pub distance: f64,
    pub state: Proximity,
}

/// Why a pair stopped being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Distance crossed the far threshold.
    Distance,
    /// A participant went offline or left the snapshot.
    Offline,
}

/// A change in a pair's classification.
#[derive(Debug, Clone, PartialEq)]
pub enum ProximityEvent {
    Enter { pair: PairKey, distance: f64 },
    Exit { pair: PairKey, reason: ExitReason },
}

impl ProximityEvent {
    pub fn pair(&self) -> &PairKey {
        match self {
            Self::Enter { pair, .. } | Self::Exit { pair, .. } => pair,
        }
    }
}

/// All events produced by one tick, evaluated against one snapshot.
///
/// Consumers must not rely on any ordering between events of the same
/// batch, even for pairs sharing a participant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityBatch {
    pub tick: u64,
    pub events: Vec<ProximityEvent>,
    /// Pairs evaluated this tick whose classification did not change.
    pub unchanged: usize,
}

impl ProximityBatch {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
