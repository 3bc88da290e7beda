//! Relationship states and the events the coordinator emits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;

/// Where the local participant stands with one remote participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipState {
    #[default]
    Unaware,
    Nearby,
    IcebreakerOffered,
    InCall,
}

impl RelationshipState {
    /// States in which the knock and icebreaker affordances are shown.
    pub fn is_approachable(self) -> bool {
        matches!(self, Self::Nearby | Self::IcebreakerOffered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unaware => "unaware",
            Self::Nearby => "nearby",
            Self::IcebreakerOffered => "icebreaker_offered",
            Self::InCall => "in_call",
        }
    }
}

impl fmt::Display for RelationshipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events emitted by the coordinator for the UI and the session.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    StateChanged {
        remote: ParticipantId,
        from: RelationshipState,
        to: RelationshipState,
    },
    /// Show "Knock" and "Suggest Icebreaker" for this remote.
    AffordanceShown { remote: ParticipantId },
    AffordanceHidden { remote: ParticipantId },
    IcebreakerSuggested { remote: ParticipantId, text: String },
    KnockSent { remote: ParticipantId },
    KnockReceived { remote: ParticipantId },
    /// Open a call with these remotes.
    CallIntent { remotes: Vec<ParticipantId> },
}
