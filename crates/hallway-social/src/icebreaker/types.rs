//! The service trait, request/response payloads and errors.

use async_trait::async_trait;
use hallway_common::CoordinationError;
use serde::{Deserialize, Serialize};

/// Context for one suggestion: what each side has shared about themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcebreakerRequest {
    pub user_context: String,
    pub other_user_context: String,
}

/// A generated conversation starter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub conversation_starter: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IcebreakerError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
    #[error("Empty suggestion")]
    Empty,
}

impl From<IcebreakerError> for CoordinationError {
    fn from(e: IcebreakerError) -> Self {
        CoordinationError::SuggestionFailed(e.to_string())
    }
}

/// Anything that can produce a conversation starter.
#[async_trait]
pub trait IcebreakerService: Send + Sync {
    async fn suggest(&self, request: &IcebreakerRequest) -> Result<Suggestion, IcebreakerError>;
}
