use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::errors::CoordinationError;

/// Severity level for user-facing notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing notice (toast).
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub body: String,
    pub created_at: Instant,
    /// `None` keeps the notice until the page is reloaded.
    pub ttl: Option<Duration>,
}

impl Notification {
    /// Creates an info notification with a 5-second TTL.
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::with_ttl(NotificationLevel::Info, title, body, Duration::from_secs(5))
    }

    /// Creates a warning notification with an 8-second TTL.
    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::with_ttl(NotificationLevel::Warning, title, body, Duration::from_secs(8))
    }

    /// Creates an error notification with a 10-second TTL.
    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::with_ttl(NotificationLevel::Error, title, body, Duration::from_secs(10))
    }

    /// An error notice that never expires.
    pub fn persistent(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            body: body.into(),
            created_at: Instant::now(),
            ttl: None,
        }
    }

    /// Builds the notice shown for a coordination failure.
    pub fn from_error(err: &CoordinationError) -> Self {
        if err.requires_reload() {
            return Self::persistent(
                "Refresh required",
                "Audio stopped. Reload the page to hear others.",
            );
        }
        match err {
            CoordinationError::SuggestionFailed(_) => Self::error(
                "Uh oh! Something went wrong.",
                "Could not generate a suggestion. Please try again.",
            ),
            CoordinationError::DeviceUnavailable(_) => {
                Self::warning("Device unavailable", err.to_string())
            }
            CoordinationError::MessageTooLong { .. } | CoordinationError::MessageEmpty => {
                Self::warning("Message not sent", err.to_string())
            }
            _ => Self::error("Something went wrong", err.to_string()),
        }
    }

    fn with_ttl(
        level: NotificationLevel,
        title: impl Into<String>,
        body: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            body: body.into(),
            created_at: Instant::now(),
            ttl: Some(ttl),
        }
    }

    /// Returns `true` if this notification has exceeded its TTL.
    pub fn is_expired(&self) -> bool {
        match self.ttl {
            Some(ttl) => self.created_at.elapsed() >= ttl,
            None => false,
        }
    }
}

/// A bounded queue of notices that auto-evicts expired entries.
#[derive(Debug)]
pub struct NotificationQueue {
    items: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Pushes a notification, evicting expired entries first.
    /// If still at capacity after eviction, the oldest entry is removed.
    pub fn push(&mut self, notification: Notification) {
        self.evict_expired();
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(notification);
    }

    /// Returns all currently visible (non-expired) notifications.
    pub fn visible(&mut self) -> Vec<&Notification> {
        self.evict_expired();
        self.items.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn evict_expired(&mut self) {
        self.items.retain(|n| !n.is_expired());
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(16)
    }
}
