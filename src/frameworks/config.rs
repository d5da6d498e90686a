use crate::domain::Vector2;
use std::{env, time::Duration};

// Runtime/server constants and environment lookups.

pub fn http_port() -> u16 {
    env::var("PARTY_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

// Base URL of an external hit-test service. Unset means hits resolve in-process.
pub fn hit_resolver_url() -> Option<String> {
    env::var("HIT_RESOLVER_URL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn hit_resolve_timeout() -> Duration {
    let millis = env::var("HIT_RESOLVE_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1500);
    Duration::from_millis(millis)
}

pub const COMMAND_CHANNEL_CAPACITY: usize = 1024;
pub const ACTION_BROADCAST_CAPACITY: usize = 128;

pub const TARGET_COUNT: usize = 7;
pub const AIM_SCALE: Vector2 = Vector2::new(64.0, 64.0);
// Scaled aim range covered by the local lane resolver, centred on zero.
pub const LANE_HALF_WIDTH: f32 = 50.0;
