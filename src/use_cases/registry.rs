// Registry of live games, keyed by join code.

use crate::domain::{GameId, HitResolver, PlayerId};
use crate::use_cases::session::GameSession;
use crate::use_cases::types::SessionSettings;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Errors returned by registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// No live game with that code.
    NotFound,
}

/// Thread-safe registry for live games.
pub struct GameRegistry {
    /// Settings applied to newly created sessions.
    settings: SessionSettings,
    /// Hit resolver shared by every session.
    resolver: Arc<dyn HitResolver>,
    /// Map of join code to live session.
    games: RwLock<HashMap<GameId, Arc<GameSession>>>,
}

impl GameRegistry {
    pub fn new(settings: SessionSettings, resolver: Arc<dyn HitResolver>) -> Self {
        Self {
            settings,
            resolver,
            games: RwLock::new(HashMap::new()),
        }
    }

    /// Creates an empty game under a fresh join code and spawns its worker.
    pub async fn create_game(&self) -> Arc<GameSession> {
        self.create_game_with(GameId::random).await
    }

    // Insert-if-absent under the write guard; a taken code just draws another.
    pub(crate) async fn create_game_with(
        &self,
        mut next_id: impl FnMut() -> GameId,
    ) -> Arc<GameSession> {
        let mut games = self.games.write().await;
        loop {
            match games.entry(next_id()) {
                Entry::Occupied(taken) => {
                    debug!(game_id = %taken.key(), "game id collision; retrying");
                }
                Entry::Vacant(slot) => {
                    let session = GameSession::spawn(
                        slot.key().clone(),
                        &self.settings,
                        Arc::clone(&self.resolver),
                    );
                    slot.insert(Arc::clone(&session));
                    info!(game_id = %session.game_id(), live_games = games.len(), "game created");
                    return session;
                }
            }
        }
    }

    /// Joins a new player to the game with the given code.
    pub async fn join_game(
        &self,
        game_id: &str,
    ) -> Result<(Arc<GameSession>, PlayerId), RegistryError> {
        let session = self.get_game(game_id).await.ok_or(RegistryError::NotFound)?;
        // An ended game may still be mid-removal; it is gone as far as joiners are concerned.
        let player_id = session
            .join()
            .await
            .map_err(|_| RegistryError::NotFound)?;
        Ok((session, player_id))
    }

    /// Returns the game for the provided code, if it is live.
    pub async fn get_game(&self, game_id: &str) -> Option<Arc<GameSession>> {
        let game_id = GameId::parse(game_id)?;
        let games = self.games.read().await;
        games.get(&game_id).cloned()
    }

    /// Removes the game and ends it. Unknown or already-deleted codes are ignored.
    pub async fn delete_game(&self, game_id: &str) {
        let Some(game_id) = GameId::parse(game_id) else {
            return;
        };
        let mut games = self.games.write().await;
        if let Some(session) = games.remove(&game_id) {
            // End while still holding the guard so no lookup can observe a removed-but-live game.
            session.end();
            info!(%game_id, live_games = games.len(), "game deleted");
        }
    }

    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.games.read().await.is_empty()
    }
}
