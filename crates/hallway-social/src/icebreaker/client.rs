//! reqwest-backed icebreaker client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::types::{IcebreakerError, IcebreakerRequest, IcebreakerService, Suggestion};

/// Connection settings for [`HttpIcebreakerClient`].
#[derive(Clone)]
pub struct HttpIcebreakerConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for HttpIcebreakerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpIcebreakerConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Posts `{"userContext", "otherUserContext"}` and reads
/// `{"conversationStarter"}`.
pub struct HttpIcebreakerClient {
    config: HttpIcebreakerConfig,
    http: reqwest::Client,
}

impl HttpIcebreakerClient {
    pub fn new(config: HttpIcebreakerConfig) -> Result<Self, IcebreakerError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.timeout)
            .build()
            .map_err(|e| IcebreakerError::NetworkError(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl IcebreakerService for HttpIcebreakerClient {
    async fn suggest(&self, request: &IcebreakerRequest) -> Result<Suggestion, IcebreakerError> {
        debug!(endpoint = %self.config.endpoint, "icebreaker request");

        let mut builder = self
            .http
            .post(&self.config.endpoint)
            .header("content-type", "application/json")
            .json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                IcebreakerError::Timeout
            } else {
                IcebreakerError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(IcebreakerError::ApiError(format!("HTTP {status}: {text}")));
        }

        let suggestion: Suggestion = response
            .json()
            .await
            .map_err(|e| IcebreakerError::ParseError(e.to_string()))?;
        if suggestion.conversation_starter.trim().is_empty() {
            return Err(IcebreakerError::Empty);
        }
        Ok(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hallway_common::CoordinationError;

    fn config(endpoint: &str) -> HttpIcebreakerConfig {
        HttpIcebreakerConfig {
            endpoint: endpoint.to_string(),
            api_key: Some("secret".into()),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn request_uses_camel_case_fields() {
        let json = serde_json::to_value(IcebreakerRequest {
            user_context: "likes hiking".into(),
            other_user_context: "plays chess".into(),
        })
        .unwrap();
        assert_eq!(json["userContext"], "likes hiking");
        assert_eq!(json["otherUserContext"], "plays chess");
    }

    #[test]
    fn suggestion_parses_response_body() {
        let s: Suggestion =
            serde_json::from_str(r#"{"conversationStarter":"Seen any good trails lately?"}"#)
                .unwrap();
        assert_eq!(s.conversation_starter, "Seen any good trails lately?");
    }

    #[test]
    fn debug_redacts_api_key() {
        let dbg = format!("{:?}", config("http://localhost:1"));
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("REDACTED"));
    }

    #[test]
    fn errors_map_to_suggestion_failed() {
        let err: CoordinationError = IcebreakerError::Timeout.into();
        assert!(matches!(err, CoordinationError::SuggestionFailed(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let client = HttpIcebreakerClient::new(config("http://127.0.0.1:9/suggest")).unwrap();
        let result = client.suggest(&IcebreakerRequest::default()).await;
        assert!(result.is_err());
    }
}
