//! Maps the loaded [`HallwayConfig`] onto session and collaborator settings.

use std::sync::Arc;
use std::time::Duration;

use hallway_common::ConfigError;
use hallway_config::schema::IcebreakerConfig;
use hallway_config::HallwayConfig;
use hallway_social::{
    AudioConfig, CallConfig, ChatConfig, GainCurve, HttpIcebreakerClient, HttpIcebreakerConfig,
    IcebreakerService, SessionConfig, Thresholds,
};
use tracing::{info, warn};

/// Session settings for `local` under `config`.
pub fn session_config(config: &HallwayConfig, local: &str) -> Result<SessionConfig, ConfigError> {
    let mut session = SessionConfig::new(local);
    session.thresholds = Thresholds::new(
        config.proximity.near_threshold,
        config.proximity.far_threshold,
    )?;
    session.audio = AudioConfig {
        gain: GainCurve {
            full_gain_within: config.audio.full_gain_within,
            silent_beyond: config.audio.silent_beyond,
            floor: config.audio.gain_floor,
        },
        gain_epsilon: config.audio.gain_epsilon,
    };
    session.call = CallConfig {
        max_participants: config.call.max_participants as usize,
        start_muted: config.call.start_muted,
        start_video_off: config.call.start_video_off,
    };
    session.chat = ChatConfig {
        max_message_length: config.chat.max_message_length as usize,
        follow_proximity: config.chat.follow_proximity,
    };
    session.user_context = config.icebreaker.user_context.clone();
    session.notification_capacity = config.notifications.capacity as usize;
    Ok(session)
}

/// The HTTP icebreaker service, when enabled and pointed at an endpoint.
pub fn icebreaker_service(config: &IcebreakerConfig) -> Option<Arc<dyn IcebreakerService>> {
    if !config.enabled {
        info!("icebreakers disabled");
        return None;
    }
    if config.endpoint.trim().is_empty() {
        info!("no icebreaker endpoint configured");
        return None;
    }

    let api_key = std::env::var(&config.api_key_env)
        .ok()
        .filter(|key| !key.is_empty());
    if api_key.is_none() {
        warn!(var = %config.api_key_env, "icebreaker API key not set; sending unauthenticated requests");
    }

    let client = HttpIcebreakerClient::new(HttpIcebreakerConfig {
        endpoint: config.endpoint.trim().to_string(),
        api_key,
        timeout: Duration::from_secs(u64::from(config.timeout_secs)),
    });
    match client {
        Ok(client) => {
            info!(endpoint = %client.endpoint(), "icebreaker service ready");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!(error = %e, "failed to build icebreaker client");
            None
        }
    }
}
