// Use-case level inputs/outputs for a game session.

use crate::domain::{PlayerId, Vector2};
use std::time::Duration;

/// Actions players send towards the host.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerAction {
    Join { player_id: PlayerId },
    // Raw device-derived angle, before aim scaling.
    Aim { player_id: PlayerId, angle: Vector2 },
    Throw { player_id: PlayerId },
    Leave { player_id: PlayerId },
}

impl PlayerAction {
    pub fn player_id(&self) -> PlayerId {
        match self {
            PlayerAction::Join { player_id }
            | PlayerAction::Aim { player_id, .. }
            | PlayerAction::Throw { player_id }
            | PlayerAction::Leave { player_id } => *player_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PlayerAction::Join { .. } => "join",
            PlayerAction::Aim { .. } => "aim",
            PlayerAction::Throw { .. } => "throw",
            PlayerAction::Leave { .. } => "leave",
        }
    }
}

/// Actions the host sends towards every player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    End,
}

/// Shared configuration for spawning game sessions.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Capacity of the per-session command queue.
    pub command_capacity: usize,
    /// Capacity of the player/host broadcast channels.
    pub broadcast_capacity: usize,
    /// Number of target slots per game.
    pub target_count: usize,
    /// Per-axis multiplier applied to raw aim angles.
    pub aim_scale: Vector2,
    /// Upper bound on a single hit resolution; expiry counts as a miss.
    pub resolve_timeout: Duration,
}
