//! Outbound collaborator traits for presence and chat.
//!
//! Inbound traffic is fed into the runtime as
//! [`InboundEvent`](crate::protocol::InboundEvent)s by whoever owns the
//! connection.

use async_trait::async_trait;
use hallway_common::CoordinationError;

use crate::chat::{ChatMessage, ChatScope};
use crate::participant::{ParticipantId, Position};

#[async_trait]
pub trait PresenceTransport: Send + Sync {
    async fn publish_position(
        &self,
        id: &ParticipantId,
        position: Position,
    ) -> Result<(), CoordinationError>;

    async fn send_knock(&self, to: &ParticipantId) -> Result<(), CoordinationError>;

    async fn acknowledge_knock(&self, to: &ParticipantId) -> Result<(), CoordinationError>;
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post(&self, scope: &ChatScope, message: &ChatMessage) -> Result<(), CoordinationError>;
}
