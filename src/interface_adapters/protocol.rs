// Wire protocol DTOs and conversions for host and player sockets.
// Outbound hit-test DTOs live with the HTTP resolver client.

use crate::domain::{PlayerView, ProjectionSnapshot};
use crate::use_cases::PlayerAction;
use serde::{Deserialize, Serialize};

/// Messages the host display sends over its WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum HostClientMessage {
    // Ends the game for every player and frees the join code.
    End,
}

/// Messages the server sends to the host display.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum HostServerMessage {
    // Join code for the new game and the path players connect to.
    Created { game_id: String, join_path: String },
    // A player action, in the order the session applied it.
    PlayerEvent(PlayerActionDto),
    // Latest scoreboard state.
    Snapshot(SnapshotDto),
    Ended,
}

/// Messages a player's phone sends over its WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PlayerClientMessage {
    // Raw orientation quaternion as `[x, y, z, w]`.
    Orientation(Vec<f32>),
    // Re-centre aim on the latest orientation.
    ResetAim,
    Throw,
}

/// Messages the server sends to a player's phone.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum PlayerServerMessage {
    // Assigned identity after the join is accepted.
    Identity {
        player_id: String,
        game_id: String,
        hue: u16,
    },
    Ended,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum PlayerActionDto {
    Join { player_id: String },
    Aim { player_id: String, x: f32, y: f32 },
    Throw { player_id: String },
    Leave { player_id: String },
}

impl From<&PlayerAction> for PlayerActionDto {
    fn from(action: &PlayerAction) -> Self {
        match action {
            PlayerAction::Join { player_id } => PlayerActionDto::Join {
                player_id: player_id.to_string(),
            },
            PlayerAction::Aim { player_id, angle } => PlayerActionDto::Aim {
                player_id: player_id.to_string(),
                x: angle.x,
                y: angle.y,
            },
            PlayerAction::Throw { player_id } => PlayerActionDto::Throw {
                player_id: player_id.to_string(),
            },
            PlayerAction::Leave { player_id } => PlayerActionDto::Leave {
                player_id: player_id.to_string(),
            },
        }
    }
}

/// Flattened projection for the host scoreboard and the HTTP snapshot route.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDto {
    pub players: Vec<PlayerStateDto>,
    pub targets: Vec<bool>,
    pub pending_throws: usize,
}

impl From<&ProjectionSnapshot> for SnapshotDto {
    fn from(snapshot: &ProjectionSnapshot) -> Self {
        Self {
            players: snapshot.players.iter().map(PlayerStateDto::from).collect(),
            targets: snapshot.targets.clone(),
            pending_throws: snapshot.pending_throws,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStateDto {
    pub player_id: String,
    pub hue: u16,
    pub aim_x: f32,
    pub aim_y: f32,
    pub score: u32,
}

impl From<&PlayerView> for PlayerStateDto {
    fn from(player: &PlayerView) -> Self {
        Self {
            player_id: player.player_id.to_string(),
            hue: player.hue,
            aim_x: player.aim.x,
            aim_y: player.aim.y,
            score: player.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlayerId, Vector2};
    use serde_json::json;

    #[test]
    fn player_messages_parse_from_tagged_json() {
        let orientation: PlayerClientMessage =
            serde_json::from_value(json!({"type": "Orientation", "data": [0.0, 0.0, 0.0, 1.0]}))
                .expect("orientation should parse");
        assert!(matches!(orientation, PlayerClientMessage::Orientation(v) if v.len() == 4));

        let throw: PlayerClientMessage =
            serde_json::from_value(json!({"type": "Throw"})).expect("throw should parse");
        assert!(matches!(throw, PlayerClientMessage::Throw));

        let reset: PlayerClientMessage =
            serde_json::from_value(json!({"type": "ResetAim"})).expect("reset should parse");
        assert!(matches!(reset, PlayerClientMessage::ResetAim));
    }

    #[test]
    fn short_orientation_still_parses_so_the_adapter_can_reject_it() {
        let msg: PlayerClientMessage =
            serde_json::from_value(json!({"type": "Orientation", "data": [1.0, 2.0]}))
                .expect("array of any length should parse");
        assert!(matches!(msg, PlayerClientMessage::Orientation(v) if v.len() == 2));
    }

    #[test]
    fn non_numeric_orientation_is_rejected() {
        let parsed = serde_json::from_value::<PlayerClientMessage>(
            json!({"type": "Orientation", "data": "sideways"}),
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn host_end_parses() {
        let msg: HostClientMessage =
            serde_json::from_value(json!({"type": "End"})).expect("end should parse");
        assert!(matches!(msg, HostClientMessage::End));
    }

    #[test]
    fn aim_event_serializes_with_kind_tag() {
        let player_id = PlayerId::from_u128(1);
        let msg = HostServerMessage::PlayerEvent(PlayerActionDto::from(&PlayerAction::Aim {
            player_id,
            angle: Vector2::new(0.5, -0.25),
        }));

        let value = serde_json::to_value(&msg).expect("message should serialize");
        assert_eq!(
            value,
            json!({
                "type": "PlayerEvent",
                "data": {
                    "kind": "Aim",
                    "player_id": player_id.to_string(),
                    "x": 0.5,
                    "y": -0.25
                }
            })
        );
    }

    #[test]
    fn snapshot_dto_flattens_players() {
        let player_id = PlayerId::from_u128(5);
        let snapshot = ProjectionSnapshot {
            players: vec![PlayerView {
                player_id,
                hue: 120,
                aim: Vector2::new(64.0, 0.0),
                score: 2,
            }],
            targets: vec![true, false],
            pending_throws: 1,
            throws_settled: 4,
        };

        let value = serde_json::to_value(SnapshotDto::from(&snapshot)).expect("snapshot should serialize");
        assert_eq!(
            value,
            json!({
                "players": [{
                    "player_id": player_id.to_string(),
                    "hue": 120,
                    "aim_x": 64.0,
                    "aim_y": 0.0,
                    "score": 2
                }],
                "targets": [true, false],
                "pending_throws": 1
            })
        );
    }
}
