use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fresh v4 UUID in hyphenated form. Used for chat message ids.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Identifier of one call session.
///
/// Displays as `call-` plus the first eight hex digits, which is enough to
/// tell calls apart in logs and transcripts; the full id is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(Uuid);

impl CallId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let simple = self.0.simple().to_string();
        write!(f, "call-{}", &simple[..8])
    }
}
