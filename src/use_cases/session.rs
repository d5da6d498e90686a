// One game: player id issuance, the player/host event bus, and the projection worker.
//
// Player calls only enqueue commands. A single worker task per session owns the projection
// and applies commands in arrival order, so concurrent players never race on the roster or
// the target pool. Throws suspend on the external resolver in a spawned task and come back
// through the same queue, where they are re-validated before touching any state.

use crate::domain::{
    GameId, HitRequest, HitResolver, PlayerId, Projection, ProjectionSnapshot, ThrowOutcome,
    Vector2,
};
use crate::use_cases::throttle::{log_ready, should_log};
use crate::use_cases::types::{HostAction, PlayerAction, SessionSettings};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Errors returned to callers of session operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The host ended the game; nothing more is accepted.
    Ended,
}

enum Command {
    Player(PlayerAction),
    ThrowResolved {
        throw_id: u64,
        player_id: PlayerId,
        outcome: ThrowOutcome,
    },
}

/// Handle to a running game. Shared between the registry, the host and every player.
pub struct GameSession {
    game_id: GameId,
    /// Queue into the projection worker.
    commands: mpsc::Sender<Command>,
    /// Player -> host fan-out, in the order the worker applied the actions.
    player_actions: broadcast::Sender<PlayerAction>,
    /// Host -> players fan-out.
    host_actions: broadcast::Sender<HostAction>,
    /// Latest projection, replaced after every change.
    snapshots: Arc<watch::Sender<ProjectionSnapshot>>,
    /// Flips to true exactly once, on end.
    ended: watch::Sender<bool>,
}

impl GameSession {
    /// Creates an empty session and spawns its worker on the current runtime.
    pub fn spawn(
        game_id: GameId,
        settings: &SessionSettings,
        resolver: Arc<dyn HitResolver>,
    ) -> Arc<Self> {
        let (commands, commands_rx) = mpsc::channel::<Command>(settings.command_capacity);
        let (player_actions, _) = broadcast::channel::<PlayerAction>(settings.broadcast_capacity);
        let (host_actions, _) = broadcast::channel::<HostAction>(settings.broadcast_capacity);
        let projection = Projection::new(settings.target_count, settings.aim_scale);
        let (snapshots, _) = watch::channel(projection.snapshot(0, 0));
        let snapshots = Arc::new(snapshots);
        let (ended, ended_rx) = watch::channel(false);

        let worker = SessionWorker {
            game_id: game_id.clone(),
            projection,
            pending: HashMap::new(),
            next_throw_id: 0,
            throws_settled: 0,
            resolver,
            resolve_timeout: settings.resolve_timeout,
            commands: commands.clone(),
            player_actions: player_actions.clone(),
            snapshots: Arc::clone(&snapshots),
            ended: ended_rx,
            last_unknown_log: log_ready(),
        };
        tokio::spawn(worker.run(commands_rx));

        Arc::new(Self {
            game_id,
            commands,
            player_actions,
            host_actions,
            snapshots,
            ended,
        })
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// Mints a player id and announces it to the host.
    pub async fn join(&self) -> Result<PlayerId, SessionError> {
        let player_id = PlayerId::new_random();
        self.submit(PlayerAction::Join { player_id }).await?;
        Ok(player_id)
    }

    /// Reports a raw aim angle. Unknown players are filtered by the projection, not here.
    pub async fn aim(&self, player_id: PlayerId, angle: Vector2) -> Result<(), SessionError> {
        self.submit(PlayerAction::Aim { player_id, angle }).await
    }

    pub async fn throw(&self, player_id: PlayerId) -> Result<(), SessionError> {
        self.submit(PlayerAction::Throw { player_id }).await
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), SessionError> {
        self.submit(PlayerAction::Leave { player_id }).await
    }

    /// Ends the game and tells every subscribed player. Only the first call has any effect;
    /// it returns true.
    pub fn end(&self) -> bool {
        let first = self.ended.send_if_modified(|ended| {
            if *ended {
                false
            } else {
                *ended = true;
                true
            }
        });

        if first {
            let listeners = self.host_actions.send(HostAction::End).unwrap_or(0);
            info!(game_id = %self.game_id, listeners, "game ended");
        }
        first
    }

    pub fn is_ended(&self) -> bool {
        *self.ended.borrow()
    }

    /// Host-side stream of player actions. Only actions applied after this call are delivered;
    /// dropping the receiver unsubscribes.
    pub fn subscribe_player_actions(&self) -> broadcast::Receiver<PlayerAction> {
        self.player_actions.subscribe()
    }

    /// Player-side stream of host actions. Only actions sent after this call are delivered.
    pub fn subscribe_host_actions(&self) -> broadcast::Receiver<HostAction> {
        self.host_actions.subscribe()
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<ProjectionSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> ProjectionSnapshot {
        self.snapshots.borrow().clone()
    }

    async fn submit(&self, action: PlayerAction) -> Result<(), SessionError> {
        if self.is_ended() {
            return Err(SessionError::Ended);
        }
        self.commands
            .send(Command::Player(action))
            .await
            .map_err(|_| SessionError::Ended)
    }
}

struct SessionWorker {
    game_id: GameId,
    projection: Projection,
    // In-flight throws by id; an entry is the only licence to apply a result.
    pending: HashMap<u64, PlayerId>,
    next_throw_id: u64,
    throws_settled: u64,
    resolver: Arc<dyn HitResolver>,
    resolve_timeout: Duration,
    // Used by resolution tasks to re-enter the queue.
    commands: mpsc::Sender<Command>,
    player_actions: broadcast::Sender<PlayerAction>,
    snapshots: Arc<watch::Sender<ProjectionSnapshot>>,
    ended: watch::Receiver<bool>,
    last_unknown_log: Instant,
}

impl SessionWorker {
    async fn run(mut self, mut commands_rx: mpsc::Receiver<Command>) {
        let mut ended = self.ended.clone();
        loop {
            tokio::select! {
                biased;
                // Also fires when every session handle is gone.
                _ = ended.wait_for(|ended| *ended) => break,
                command = commands_rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }
        debug!(
            game_id = %self.game_id,
            pending = self.pending.len(),
            "session worker stopped"
        );
    }

    fn handle(&mut self, command: Command) {
        if *self.ended.borrow() {
            debug!(game_id = %self.game_id, "game ended; command discarded");
            return;
        }
        match command {
            Command::Player(action) => self.apply_player_action(action),
            Command::ThrowResolved {
                throw_id,
                player_id,
                outcome,
            } => self.finish_throw(throw_id, player_id, outcome),
        }
    }

    fn apply_player_action(&mut self, action: PlayerAction) {
        let player_id = action.player_id();
        let changed = match &action {
            PlayerAction::Join { .. } => {
                // Throws from an earlier join of the same id must not score for this one.
                self.drop_pending(player_id);
                self.projection.join(player_id);
                info!(game_id = %self.game_id, %player_id, "player joined");
                true
            }
            PlayerAction::Aim { angle, .. } => self.projection.aim(player_id, *angle),
            PlayerAction::Throw { .. } => self.start_throw(player_id),
            PlayerAction::Leave { .. } => {
                let dropped = self.drop_pending(player_id);
                let left = self.projection.leave(player_id);
                if left {
                    info!(game_id = %self.game_id, %player_id, dropped, "player left");
                }
                left
            }
        };

        if changed {
            self.publish_snapshot();
        } else if should_log(&mut self.last_unknown_log) {
            warn!(
                game_id = %self.game_id,
                %player_id,
                action = action.kind(),
                "action for unknown player; dropping"
            );
        }

        // The bus carries every accepted action, including ones the projection ignored.
        let _ = self.player_actions.send(action);
    }

    // Phase one of a throw: validate, record it as pending, and hand it to the resolver.
    fn start_throw(&mut self, player_id: PlayerId) -> bool {
        let Some(player) = self.projection.get(player_id) else {
            return false;
        };

        let throw_id = self.next_throw_id;
        self.next_throw_id += 1;
        self.pending.insert(throw_id, player_id);

        let request = HitRequest {
            game_id: self.game_id.clone(),
            player_id,
            aim: player.aim,
        };
        let game_id = self.game_id.clone();
        let resolver = Arc::clone(&self.resolver);
        let commands = self.commands.clone();
        let mut ended = self.ended.clone();
        let resolve_timeout = self.resolve_timeout;

        debug!(%game_id, %player_id, throw_id, "throw pending");
        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = ended.wait_for(|ended| *ended) => {
                    debug!(%game_id, %player_id, throw_id, "game ended; throw resolution abandoned");
                    return;
                }
                result = timeout(resolve_timeout, resolver.resolve(request)) => match result {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(error)) => {
                        warn!(%game_id, %player_id, ?error, "hit resolver failed; counting as miss");
                        ThrowOutcome::Miss
                    }
                    Err(_) => {
                        warn!(
                            %game_id,
                            %player_id,
                            timeout_ms = resolve_timeout.as_millis() as u64,
                            "hit resolution timed out; counting as miss"
                        );
                        ThrowOutcome::Miss
                    }
                },
            };

            let resolved = Command::ThrowResolved {
                throw_id,
                player_id,
                outcome,
            };
            if commands.send(resolved).await.is_err() {
                debug!(%game_id, %player_id, throw_id, "session closed before throw result arrived");
            }
        });
        true
    }

    // Phase two: apply the result only if the throw is still pending for this player.
    fn finish_throw(&mut self, throw_id: u64, player_id: PlayerId, outcome: ThrowOutcome) {
        self.throws_settled += 1;

        if self.pending.remove(&throw_id).is_none() {
            debug!(game_id = %self.game_id, %player_id, throw_id, "stale throw result discarded");
        } else if self.projection.apply_throw(player_id, outcome) {
            info!(game_id = %self.game_id, %player_id, ?outcome, "target hit");
        } else {
            debug!(game_id = %self.game_id, %player_id, ?outcome, "throw scored nothing");
        }

        self.publish_snapshot();
    }

    fn drop_pending(&mut self, player_id: PlayerId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, owner| *owner != player_id);
        before - self.pending.len()
    }

    fn publish_snapshot(&self) {
        self.snapshots.send_replace(
            self.projection
                .snapshot(self.pending.len(), self.throws_settled),
        );
    }
}
