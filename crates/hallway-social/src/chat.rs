//! Chat channels scoped globally or to a proximity pair.
//!
//! Each scope keeps its own append-only history. Insertion order is display
//! order, and a message id is never appended twice, so the echo of a
//! locally posted message is dropped on delivery.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use hallway_common::{new_id, CoordinationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::participant::ParticipantId;
use crate::proximity::PairKey;

/// Which conversation a message belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pair", rename_all = "snake_case")]
pub enum ChatScope {
    #[default]
    Global,
    Proximity(PairKey),
}

impl fmt::Display for ChatScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Proximity(pair) => write!(f, "proximity:{pair}"),
        }
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Author {
    Local,
    Remote { id: ParticipantId, name: String },
    System,
}

impl Author {
    /// Label shown next to the message.
    pub fn label(&self) -> &str {
        match self {
            Self::Local => "You",
            Self::Remote { name, .. } => name,
            Self::System => "System",
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub scope: ChatScope,
    pub author: Author,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Configuration for chat.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Maximum message length in characters.
    pub max_message_length: usize,
    /// Switch the active scope to a proximity channel when a pair forms.
    pub follow_proximity: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: 500,
            follow_proximity: true,
        }
    }
}

/// Append-only history for one scope.
#[derive(Debug, Clone)]
pub struct ChatChannel {
    scope: ChatScope,
    max_message_length: usize,
    messages: Vec<ChatMessage>,
    seen: HashSet<String>,
}

impl ChatChannel {
    pub fn new(scope: ChatScope, max_message_length: usize) -> Self {
        Self {
            scope,
            max_message_length,
            messages: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Validate and append a local message.
    ///
    /// The limit applies to the text as typed; surrounding whitespace is
    /// trimmed only from what gets kept. Nothing is appended on error.
    pub fn post(&mut self, author: Author, text: &str) -> Result<ChatMessage, CoordinationError> {
        let len = text.chars().count();
        if len > self.max_message_length {
            return Err(CoordinationError::MessageTooLong {
                len,
                max: self.max_message_length,
            });
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(CoordinationError::MessageEmpty);
        }

        let message = ChatMessage {
            id: new_id(),
            scope: self.scope.clone(),
            author,
            text: text.to_string(),
            timestamp: Utc::now(),
        };
        self.seen.insert(message.id.clone());
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Append an inbound message. Returns `false` for an id already present.
    pub fn deliver(&mut self, message: ChatMessage) -> bool {
        if !self.seen.insert(message.id.clone()) {
            debug!(scope = %self.scope, id = %message.id, "duplicate chat message dropped");
            return false;
        }
        self.messages.push(message);
        true
    }

    pub fn scope(&self) -> &ChatScope {
        &self.scope
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// One channel per scope plus the scope currently shown.
pub struct ChatBook {
    config: ChatConfig,
    channels: HashMap<ChatScope, ChatChannel>,
    active: ChatScope,
}

impl ChatBook {
    pub fn new(config: ChatConfig) -> Self {
        let mut channels = HashMap::new();
        channels.insert(
            ChatScope::Global,
            ChatChannel::new(ChatScope::Global, config.max_message_length),
        );
        Self {
            config,
            channels,
            active: ChatScope::Global,
        }
    }

    pub fn active(&self) -> &ChatScope {
        &self.active
    }

    pub fn active_channel(&self) -> Option<&ChatChannel> {
        self.channels.get(&self.active)
    }

    pub fn channel(&self, scope: &ChatScope) -> Option<&ChatChannel> {
        self.channels.get(scope)
    }

    /// Show another scope. Histories are never merged.
    ///
    /// Returns `true` when the active scope changed.
    pub fn set_active(&mut self, scope: ChatScope) -> bool {
        if self.active == scope {
            return false;
        }
        self.channel_mut(&scope);
        debug!(from = %self.active, to = %scope, "active chat scope changed");
        self.active = scope;
        true
    }

    /// Post into the active scope.
    pub fn post(&mut self, author: Author, text: &str) -> Result<ChatMessage, CoordinationError> {
        let scope = self.active.clone();
        self.channel_mut(&scope).post(author, text)
    }

    /// Deliver an inbound message into its own scope.
    pub fn deliver(&mut self, message: ChatMessage) -> bool {
        let scope = message.scope.clone();
        self.channel_mut(&scope).deliver(message)
    }

    /// A pair involving the local participant formed.
    pub fn pair_entered(&mut self, pair: &PairKey) -> bool {
        if !self.config.follow_proximity || self.active != ChatScope::Global {
            return false;
        }
        self.set_active(ChatScope::Proximity(pair.clone()))
    }

    /// A pair dissolved. Falls back to `Global` when its scope was shown.
    pub fn pair_exited(&mut self, pair: &PairKey) -> bool {
        if self.active != ChatScope::Proximity(pair.clone()) {
            return false;
        }
        self.set_active(ChatScope::Global)
    }

    fn channel_mut(&mut self, scope: &ChatScope) -> &mut ChatChannel {
        let max = self.config.max_message_length;
        self.channels
            .entry(scope.clone())
            .or_insert_with(|| ChatChannel::new(scope.clone(), max))
    }
}
