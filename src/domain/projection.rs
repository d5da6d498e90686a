// Host-visible projection folded from the player action stream.

use crate::domain::aim::Vector2;
use crate::domain::ids::PlayerId;
use crate::domain::targets::TargetPool;
use std::collections::HashMap;

/// Result of a throw as reported by the hit resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowOutcome {
    Hit(usize),
    Miss,
}

/// Per-player state the host renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProjection {
    pub hue: u16,
    // Scaled aim; replaced wholesale on every aim update.
    pub aim: Vector2,
    pub score: u32,
    // Join order, used to keep snapshots stable.
    joined_seq: u64,
}

impl PlayerProjection {
    fn fresh(player_id: PlayerId, joined_seq: u64) -> Self {
        Self {
            hue: player_id.hue(),
            aim: Vector2::ZERO,
            score: 0,
            joined_seq,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub hue: u16,
    pub aim: Vector2,
    pub score: u32,
}

/// Immutable copy of the projection published after each change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionSnapshot {
    pub players: Vec<PlayerView>,
    pub targets: Vec<bool>,
    // Throws waiting on the resolver.
    pub pending_throws: usize,
    // Throws whose resolution was applied or discarded.
    pub throws_settled: u64,
}

impl ProjectionSnapshot {
    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.player_id == player_id)
    }
}

/// Roster plus target pool for one game.
///
/// Not synchronized; the owning session worker is the only writer.
#[derive(Debug)]
pub struct Projection {
    players: HashMap<PlayerId, PlayerProjection>,
    targets: TargetPool,
    aim_scale: Vector2,
    next_seq: u64,
}

impl Projection {
    pub fn new(target_count: usize, aim_scale: Vector2) -> Self {
        Self {
            players: HashMap::new(),
            targets: TargetPool::new(target_count),
            aim_scale,
            next_seq: 0,
        }
    }

    /// Inserts (or resets) the player with zero aim and zero score.
    pub fn join(&mut self, player_id: PlayerId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.players
            .insert(player_id, PlayerProjection::fresh(player_id, seq));
    }

    /// Replaces the player's aim with `angle * aim_scale`. False if the player is unknown.
    pub fn aim(&mut self, player_id: PlayerId, angle: Vector2) -> bool {
        match self.players.get_mut(&player_id) {
            Some(player) => {
                player.aim = angle.scale(self.aim_scale);
                true
            }
            None => false,
        }
    }

    /// Applies a resolved throw. True only when a slot was claimed and the score moved.
    pub fn apply_throw(&mut self, player_id: PlayerId, outcome: ThrowOutcome) -> bool {
        let Some(player) = self.players.get_mut(&player_id) else {
            return false;
        };
        match outcome {
            ThrowOutcome::Hit(index) if self.targets.resolve_hit(index) => {
                player.score += 1;
                true
            }
            ThrowOutcome::Hit(_) | ThrowOutcome::Miss => false,
        }
    }

    pub fn leave(&mut self, player_id: PlayerId) -> bool {
        self.players.remove(&player_id).is_some()
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&PlayerProjection> {
        self.players.get(&player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn targets(&self) -> &TargetPool {
        &self.targets
    }

    pub fn snapshot(&self, pending_throws: usize, throws_settled: u64) -> ProjectionSnapshot {
        let mut ordered: Vec<(&PlayerId, &PlayerProjection)> = self.players.iter().collect();
        ordered.sort_by_key(|(_, p)| p.joined_seq);

        ProjectionSnapshot {
            players: ordered
                .into_iter()
                .map(|(id, p)| PlayerView {
                    player_id: *id,
                    hue: p.hue,
                    aim: p.aim,
                    score: p.score,
                })
                .collect(),
            targets: self.targets.flags(),
            pending_throws,
            throws_settled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: Vector2 = Vector2::new(64.0, 64.0);

    fn projection() -> Projection {
        Projection::new(7, SCALE)
    }

    #[test]
    fn join_creates_zeroed_entry_with_stable_hue() {
        let mut projection = projection();
        let id = PlayerId::from_u128(7);
        projection.join(id);

        let player = projection.get(id).expect("player should exist");
        assert_eq!(player.score, 0);
        assert_eq!(player.aim, Vector2::ZERO);
        assert_eq!(player.hue, id.hue());
        assert_eq!(projection.len(), 1);
    }

    #[test]
    fn rejoin_resets_existing_entry() {
        let mut projection = projection();
        let id = PlayerId::from_u128(1);
        projection.join(id);
        projection.aim(id, Vector2::new(1.0, 1.0));
        assert!(projection.apply_throw(id, ThrowOutcome::Hit(0)));

        projection.join(id);

        let player = projection.get(id).expect("player should exist");
        assert_eq!(player.score, 0);
        assert_eq!(player.aim, Vector2::ZERO);
        assert_eq!(projection.len(), 1);
    }

    #[test]
    fn aim_replaces_with_scaled_angle() {
        let mut projection = projection();
        let id = PlayerId::from_u128(2);
        projection.join(id);

        assert!(projection.aim(id, Vector2::new(1.0, 0.0)));
        assert_eq!(projection.get(id).map(|p| p.aim), Some(Vector2::new(64.0, 0.0)));

        assert!(projection.aim(id, Vector2::new(0.0, -0.5)));
        assert_eq!(projection.get(id).map(|p| p.aim), Some(Vector2::new(0.0, -32.0)));
    }

    #[test]
    fn aim_for_unknown_player_is_dropped() {
        let mut projection = projection();
        assert!(!projection.aim(PlayerId::from_u128(3), Vector2::new(1.0, 0.0)));
        assert!(projection.is_empty());
    }

    #[test]
    fn first_hit_on_slot_scores_and_second_does_not() {
        let mut projection = projection();
        let (a, b) = (PlayerId::from_u128(10), PlayerId::from_u128(11));
        projection.join(a);
        projection.join(b);

        assert!(projection.apply_throw(a, ThrowOutcome::Hit(4)));
        assert!(!projection.apply_throw(b, ThrowOutcome::Hit(4)));
        assert!(!projection.apply_throw(a, ThrowOutcome::Hit(4)));

        assert_eq!(projection.get(a).map(|p| p.score), Some(1));
        assert_eq!(projection.get(b).map(|p| p.score), Some(0));
        assert_eq!(projection.targets().remaining(), 6);
    }

    #[test]
    fn miss_and_out_of_range_change_nothing() {
        let mut projection = projection();
        let id = PlayerId::from_u128(12);
        projection.join(id);

        assert!(!projection.apply_throw(id, ThrowOutcome::Miss));
        assert!(!projection.apply_throw(id, ThrowOutcome::Hit(99)));
        assert_eq!(projection.get(id).map(|p| p.score), Some(0));
        assert_eq!(projection.targets().remaining(), 7);
    }

    #[test]
    fn throw_from_absent_player_leaves_slot_available() {
        let mut projection = projection();
        let id = PlayerId::from_u128(13);

        assert!(!projection.apply_throw(id, ThrowOutcome::Hit(0)));
        assert!(projection.targets().is_available(0));
    }

    #[test]
    fn leave_removes_entry_and_later_actions_are_no_ops() {
        let mut projection = projection();
        let id = PlayerId::from_u128(14);
        projection.join(id);

        assert!(projection.leave(id));
        assert!(!projection.leave(id));
        assert!(!projection.aim(id, Vector2::new(1.0, 1.0)));
        assert!(!projection.apply_throw(id, ThrowOutcome::Hit(0)));
        assert!(projection.is_empty());
        assert!(projection.targets().is_available(0));
    }

    #[test]
    fn snapshot_lists_players_in_join_order() {
        let mut projection = projection();
        let ids: Vec<PlayerId> = (100..105).map(PlayerId::from_u128).rev().collect();
        for id in &ids {
            projection.join(*id);
        }
        projection.apply_throw(ids[2], ThrowOutcome::Hit(1));

        let snapshot = projection.snapshot(0, 1);
        let listed: Vec<PlayerId> = snapshot.players.iter().map(|p| p.player_id).collect();
        assert_eq!(listed, ids);
        assert_eq!(snapshot.player(ids[2]).map(|p| p.score), Some(1));
        assert_eq!(snapshot.targets.len(), 7);
        assert!(!snapshot.targets[1]);
        assert_eq!(snapshot.throws_settled, 1);
    }
}
