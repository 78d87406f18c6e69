//! Lobby lifecycle engine
//!
//! The engine is the only writer of lobby state. It translates domain
//! requests into atomic store operations, enforces the status state
//! machine, and maps storage outcomes into the service error taxonomy.

use crate::error::{LobbyError, Result};
use crate::lobby::results::ResultProducer;
use crate::metrics::MetricsCollector;
use crate::store::{AppendOutcome, MembershipStore, RemoveOutcome};
use crate::types::{
    GameId, GameResult, GameStatus, LeaveOutcome, LobbyDetails, LobbyId, LobbySummary, UserId,
};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{info, warn};

/// Statistics about engine operations
#[derive(Debug, Clone, Default)]
pub struct LobbyEngineStats {
    /// Total number of lobbies created
    pub lobbies_created: u64,
    /// Total number of lobbies removed (leaves that emptied + closes)
    pub lobbies_removed: u64,
    /// Total successful joins
    pub members_joined: u64,
    /// Total leaves
    pub members_left: u64,
    /// Total games ended
    pub games_ended: u64,
    /// Total games continued after ending
    pub games_continued: u64,
    /// Current number of visible lobbies
    pub active_lobbies: usize,
    /// Current number of members across visible lobbies
    pub members_waiting: usize,
}

/// The lobby lifecycle engine
#[derive(Clone)]
pub struct LobbyEngine {
    /// Membership store, injected so storage can be swapped
    store: Arc<dyn MembershipStore>,
    /// Producer for end-of-game snapshots
    result_producer: Arc<dyn ResultProducer>,
    /// Engine statistics
    stats: Arc<RwLock<LobbyEngineStats>>,
    /// Metrics collector for recording operation data
    metrics: Arc<MetricsCollector>,
}

impl LobbyEngine {
    /// Create a new engine with a default metrics collector
    pub fn new(store: Arc<dyn MembershipStore>, result_producer: Arc<dyn ResultProducer>) -> Self {
        let metrics = Arc::new(MetricsCollector::new().unwrap_or_else(|_| {
            warn!("Failed to create metrics collector, using default");
            MetricsCollector::default()
        }));

        Self::with_metrics(store, result_producer, metrics)
    }

    /// Create a new engine with an explicit metrics collector
    pub fn with_metrics(
        store: Arc<dyn MembershipStore>,
        result_producer: Arc<dyn ResultProducer>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            store,
            result_producer,
            stats: Arc::new(RwLock::new(LobbyEngineStats::default())),
            metrics,
        }
    }

    /// List all visible lobbies. No side effects.
    pub async fn list_lobbies(&self) -> Result<Vec<LobbySummary>> {
        let start = Instant::now();

        let lobbies = self.store.list_visible().await?;
        let summaries = lobbies.iter().map(|l| l.summary()).collect();

        self.metrics.record_operation("list_lobbies", start.elapsed());
        Ok(summaries)
    }

    /// Full membership view of one lobby
    pub async fn lobby_detail(&self, lobby_id: LobbyId) -> Result<LobbyDetails> {
        let start = Instant::now();

        let lobby = self.store.get(lobby_id).await?.ok_or_else(|| {
            LobbyError::LobbyNotFound {
                lobby_id: lobby_id.to_string(),
            }
        })?;

        self.metrics.record_operation("lobby_detail", start.elapsed());
        Ok(lobby.details())
    }

    /// Create a lobby with the creator as its sole member
    pub async fn create_lobby(
        &self,
        name: &str,
        capacity: usize,
        creator: UserId,
    ) -> Result<LobbyDetails> {
        let start = Instant::now();

        // The creator occupies a seat, so a zero-capacity lobby could
        // never satisfy the capacity invariant
        if capacity == 0 {
            return Err(LobbyError::CapacityExceeded {
                lobby_id: format!("(new lobby '{}')", name),
            }
            .into());
        }

        let lobby = self.store.create(name, capacity, creator.clone()).await?;

        info!(
            lobby_id = %lobby.id,
            name, capacity, creator = %creator,
            "lobby created"
        );

        self.update_stats(|stats| stats.lobbies_created += 1)?;
        self.metrics.lobby().lobbies_created_total.inc();
        self.metrics.record_operation("create_lobby", start.elapsed());

        Ok(lobby.details())
    }

    /// Add a member to a lobby.
    ///
    /// The capacity check and the append are one atomic store step, so
    /// concurrent joins cannot jointly exceed capacity. Joining a lobby
    /// the user already belongs to succeeds without duplicating them.
    pub async fn join_lobby(&self, lobby_id: LobbyId, user_id: UserId) -> Result<()> {
        let start = Instant::now();

        let outcome = self.store.append_member(lobby_id, user_id.clone()).await?;

        match outcome {
            AppendOutcome::Appended { members } => {
                info!(
                    lobby_id = %lobby_id, user_id = %user_id,
                    current_size = members.len(),
                    "member joined lobby"
                );
                self.update_stats(|stats| stats.members_joined += 1)?;
                self.metrics.record_operation("join_lobby", start.elapsed());
                Ok(())
            }
            AppendOutcome::AlreadyMember { .. } => {
                info!(lobby_id = %lobby_id, user_id = %user_id, "join ignored, already a member");
                self.metrics.record_operation("join_lobby", start.elapsed());
                Ok(())
            }
            AppendOutcome::AtCapacity => {
                self.metrics.record_operation_error("join_lobby");
                Err(LobbyError::CapacityExceeded {
                    lobby_id: lobby_id.to_string(),
                }
                .into())
            }
            AppendOutcome::NotFound => {
                self.metrics.record_operation_error("join_lobby");
                Err(LobbyError::LobbyNotFound {
                    lobby_id: lobby_id.to_string(),
                }
                .into())
            }
        }
    }

    /// Remove a member from a lobby. Emptying the lobby deletes it as
    /// part of the same operation, reported in the outcome.
    pub async fn leave_lobby(&self, lobby_id: LobbyId, user_id: &str) -> Result<LeaveOutcome> {
        let start = Instant::now();

        let outcome = self.store.remove_member(lobby_id, user_id).await?;

        match outcome {
            RemoveOutcome::Removed {
                members,
                lobby_deleted,
            } => {
                info!(
                    lobby_id = %lobby_id, user_id,
                    remaining = members.len(),
                    lobby_deleted,
                    "member left lobby"
                );
                self.update_stats(|stats| {
                    stats.members_left += 1;
                    if lobby_deleted {
                        stats.lobbies_removed += 1;
                    }
                })?;
                self.metrics.record_operation("leave_lobby", start.elapsed());
                Ok(LeaveOutcome { lobby_deleted })
            }
            RemoveOutcome::NotFound => {
                self.metrics.record_operation_error("leave_lobby");
                Err(LobbyError::LobbyNotFound {
                    lobby_id: lobby_id.to_string(),
                }
                .into())
            }
        }
    }

    /// End the game: transition the lobby to `Ended` and produce one
    /// result record per participant. The lobby stays visible.
    pub async fn end_game(&self, game_id: GameId) -> Result<GameResult> {
        let start = Instant::now();

        let lobby = self.store.get(game_id).await?.ok_or_else(|| {
            LobbyError::LobbyNotFound {
                lobby_id: game_id.to_string(),
            }
        })?;

        let previous = self
            .store
            .set_status(game_id, GameStatus::Ended)
            .await?
            .ok_or_else(|| LobbyError::LobbyNotFound {
                lobby_id: game_id.to_string(),
            })?;

        let result = self.result_producer.produce(&lobby.members);

        info!(
            game_id = %game_id,
            participants = result.nations.len(),
            previous_status = %previous,
            "game ended"
        );

        self.update_stats(|stats| stats.games_ended += 1)?;
        self.metrics.lobby().games_ended_total.inc();
        self.metrics.record_operation("end_game", start.elapsed());

        Ok(result)
    }

    /// Reopen an ended game for another round
    pub async fn continue_game(&self, game_id: GameId) -> Result<()> {
        let start = Instant::now();

        let previous = self
            .store
            .set_status(game_id, GameStatus::Open)
            .await?
            .ok_or_else(|| LobbyError::LobbyNotFound {
                lobby_id: game_id.to_string(),
            })?;

        info!(game_id = %game_id, previous_status = %previous, "game continued");

        self.update_stats(|stats| stats.games_continued += 1)?;
        self.metrics.record_operation("continue_game", start.elapsed());
        Ok(())
    }

    /// Current in-play status of a game. Placeholder contract: the
    /// endpoint shape is preserved but no state is reported yet.
    pub async fn game_status(&self, _game_id: GameId) -> Result<()> {
        self.metrics
            .record_operation("game_status", std::time::Duration::default());
        Ok(())
    }

    /// Close a game, deleting its record. Idempotent: closing an absent
    /// game is still a success.
    pub async fn close_game(&self, game_id: GameId) -> Result<()> {
        let start = Instant::now();

        let existed = self.store.delete(game_id).await?;

        info!(game_id = %game_id, existed, "game closed");

        if existed {
            self.update_stats(|stats| stats.lobbies_removed += 1)?;
        }
        self.metrics.record_operation("close_game", start.elapsed());
        Ok(())
    }

    /// Snapshot of engine statistics with current occupancy figures
    pub async fn get_stats(&self) -> Result<LobbyEngineStats> {
        let lobbies = self.store.list_visible().await?;

        let mut stats = self
            .stats
            .read()
            .map_err(|_| LobbyError::InternalError {
                message: "Failed to acquire stats lock".to_string(),
            })?
            .clone();

        stats.active_lobbies = lobbies.len();
        stats.members_waiting = lobbies.iter().map(|l| l.current_size()).sum();

        Ok(stats)
    }

    fn update_stats<F: FnOnce(&mut LobbyEngineStats)>(&self, apply: F) -> Result<()> {
        let mut stats = self.stats.write().map_err(|_| LobbyError::InternalError {
            message: "Failed to acquire stats lock".to_string(),
        })?;
        apply(&mut stats);
        Ok(())
    }
}
