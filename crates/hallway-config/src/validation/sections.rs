//! Per-section validation rules.

use crate::schema::HallwayConfig;

use super::helpers::{validate_optional_url, validate_ordered, validate_positive, validate_range};

/// Thresholds must be positive and leave a hysteresis band.
pub(crate) fn validate_proximity(errors: &mut Vec<String>, config: &HallwayConfig) {
    let p = &config.proximity;
    validate_positive(errors, "proximity.near_threshold", p.near_threshold);
    validate_positive(errors, "proximity.far_threshold", p.far_threshold);
    validate_ordered(
        errors,
        ("proximity.near_threshold", p.near_threshold),
        ("proximity.far_threshold", p.far_threshold),
    );
    validate_range(errors, "proximity.tick_interval_ms", p.tick_interval_ms, 16, 5000);
}

pub(crate) fn validate_audio(errors: &mut Vec<String>, config: &HallwayConfig) {
    let a = &config.audio;
    validate_range(errors, "audio.poll_interval_ms", a.poll_interval_ms, 50, 10_000);
    validate_positive(errors, "audio.full_gain_within", a.full_gain_within);
    validate_positive(errors, "audio.silent_beyond", a.silent_beyond);
    validate_ordered(
        errors,
        ("audio.full_gain_within", a.full_gain_within),
        ("audio.silent_beyond", a.silent_beyond),
    );
    validate_range(errors, "audio.gain_floor", a.gain_floor, 0.0, 1.0);
    validate_range(errors, "audio.gain_epsilon", a.gain_epsilon, 0.0, 0.5);
}

pub(crate) fn validate_chat(errors: &mut Vec<String>, config: &HallwayConfig) {
    validate_range(
        errors,
        "chat.max_message_length",
        config.chat.max_message_length,
        1,
        5000,
    );
}

pub(crate) fn validate_call(errors: &mut Vec<String>, config: &HallwayConfig) {
    validate_range(
        errors,
        "call.max_participants",
        config.call.max_participants,
        2,
        32,
    );
}

pub(crate) fn validate_icebreaker(errors: &mut Vec<String>, config: &HallwayConfig) {
    let i = &config.icebreaker;
    validate_range(errors, "icebreaker.timeout_secs", i.timeout_secs, 1, 120);
    validate_optional_url(errors, "icebreaker.endpoint", &i.endpoint);
}

pub(crate) fn validate_notifications(errors: &mut Vec<String>, config: &HallwayConfig) {
    validate_range(
        errors,
        "notifications.capacity",
        config.notifications.capacity,
        1,
        64,
    );
}
