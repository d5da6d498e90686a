use async_trait::async_trait;

use crate::domain::aim::Vector2;
use crate::domain::ids::{GameId, PlayerId};
use crate::domain::projection::ThrowOutcome;

// Context handed to the hit resolver for a single throw.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRequest {
    pub game_id: GameId,
    pub player_id: PlayerId,
    // Scaled aim of the thrower at the moment the throw was accepted.
    pub aim: Vector2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    Unavailable,
    InvalidResponse,
}

// Port for deciding which target, if any, a throw struck.
// Latency is not under our control; callers bound it with a timeout.
#[async_trait]
pub trait HitResolver: Send + Sync {
    async fn resolve(&self, request: HitRequest) -> Result<ThrowOutcome, ResolveError>;
}
