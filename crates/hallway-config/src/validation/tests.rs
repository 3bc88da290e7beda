//! Tests for the full validation pipeline.

use super::*;
use crate::schema::HallwayConfig;

#[test]
fn default_config_validates() {
    let config = HallwayConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_far_not_exceeding_near() {
    let mut config = HallwayConfig::default();
    config.proximity.near_threshold = 70.0;
    config.proximity.far_threshold = 70.0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("proximity.far_threshold"));
}

#[test]
fn catches_non_positive_threshold() {
    let mut config = HallwayConfig::default();
    config.proximity.near_threshold = 0.0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("proximity.near_threshold"));
}

#[test]
fn catches_nan_threshold() {
    let mut config = HallwayConfig::default();
    config.proximity.far_threshold = f64::NAN;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("proximity.far_threshold"));
}

#[test]
fn catches_tick_interval_out_of_range() {
    let mut config = HallwayConfig::default();
    config.proximity.tick_interval_ms = 1;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("proximity.tick_interval_ms"));
}

#[test]
fn catches_inverted_gain_curve() {
    let mut config = HallwayConfig::default();
    config.audio.full_gain_within = 400.0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("audio.silent_beyond"));
}

#[test]
fn catches_gain_floor_above_one() {
    let mut config = HallwayConfig::default();
    config.audio.gain_floor = 1.5;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("audio.gain_floor"));
}

#[test]
fn catches_zero_message_length() {
    let mut config = HallwayConfig::default();
    config.chat.max_message_length = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("chat.max_message_length"));
}

#[test]
fn catches_single_participant_calls() {
    let mut config = HallwayConfig::default();
    config.call.max_participants = 1;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("call.max_participants"));
}

#[test]
fn catches_non_http_endpoint() {
    let mut config = HallwayConfig::default();
    config.icebreaker.endpoint = "ftp://example.com".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("icebreaker.endpoint"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = HallwayConfig::default();
    config.chat.max_message_length = 0;
    config.notifications.capacity = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("chat.max_message_length"));
    assert!(err.contains("notifications.capacity"));
    assert!(err.contains("; "));
}

#[test]
fn catches_endpoint_without_host() {
    let mut config = HallwayConfig::default();
    config.icebreaker.endpoint = "https://".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("icebreaker.endpoint"));
}

#[test]
fn accepts_https_endpoint() {
    let mut config = HallwayConfig::default();
    config.icebreaker.endpoint = "https://icebreaker.example.com/v1/suggest".into();
    assert!(validate(&config).is_ok());
}
