//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Hallway Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[proximity]
# Distances are in world units. far_threshold must exceed near_threshold.
# near_threshold = 50.0
# far_threshold = 70.0
# tick_interval_ms = 100   # 16-5000

[audio]
# poll_interval_ms = 500   # 50-10000
# full_gain_within = 50.0
# silent_beyond = 300.0
# gain_floor = 0.0         # 0.0-1.0
# gain_epsilon = 0.01

[chat]
# max_message_length = 500 # 1-5000
# follow_proximity = true

[call]
# max_participants = 8     # 2-32
# start_muted = false
# start_video_off = false

[icebreaker]
# enabled = true
# endpoint = ""
# api_key_env = "HALLWAY_ICEBREAKER_KEY"
# timeout_secs = 20        # 1-120
# user_context = ""

[notifications]
# capacity = 16            # 1-64

[logging]
# level = "info"           # trace, debug, info, warn, error
"##
    .to_string()
}
