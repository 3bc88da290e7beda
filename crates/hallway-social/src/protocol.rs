//! Payloads exchanged with the presence and chat transports.
//!
//! The transport envelope is the collaborator's business; these are the
//! application-level bodies that ride inside it.

use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;
use crate::participant::{ParticipantId, Position};

// ---------------------------------------------------------------------------
// Broadcast event names
// ---------------------------------------------------------------------------

pub mod events {
    pub const POSITION_UPDATE: &str = "position_update";
    pub const KNOCK: &str = "knock";
    pub const KNOCK_ACK: &str = "knock_ack";
    pub const CHAT_MESSAGE: &str = "chat_message";
}

// ---------------------------------------------------------------------------
// Outbound payloads
// ---------------------------------------------------------------------------

/// Payload for position broadcasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPayload {
    pub user_id: ParticipantId,
    pub position: Position,
}

/// Payload for knocks and their acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockPayload {
    pub from: ParticipantId,
    pub to: ParticipantId,
}

// ---------------------------------------------------------------------------
// Inbound events
// ---------------------------------------------------------------------------

/// Something the transports delivered to this client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    KnockReceived { from: ParticipantId },
    KnockAcknowledged { from: ParticipantId },
    ChatMessage { message: ChatMessage },
    CallParticipantJoined { id: ParticipantId },
    CallParticipantLeft { id: ParticipantId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_event_is_tagged() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"type":"knock_received","from":"bob"}"#).unwrap();
        assert_eq!(event, InboundEvent::KnockReceived { from: "bob".into() });
    }

    #[test]
    fn knock_payload_round_trip() {
        let payload = KnockPayload {
            from: "a".into(),
            to: "b".into(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"from":"a","to":"b"}"#);
    }
}
