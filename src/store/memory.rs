//! In-memory membership store
//!
//! Lobby records live in a `HashMap` behind a single `RwLock`. Every
//! mutation takes the write guard and completes its whole
//! read-check-mutate sequence inside one critical section, which is the
//! per-record serialization point the capacity invariant relies on: two
//! concurrent joins on the same lobby cannot both pass the capacity check,
//! and a join racing a leave cannot lose either update.

use crate::error::{LobbyError, Result};
use crate::store::{AppendOutcome, MembershipStore, RemoveOutcome};
use crate::types::{GameStatus, Lobby, LobbyId, UserId};
use crate::utils::{current_timestamp, generate_lobby_id};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Membership store backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryMembershipStore {
    lobbies: RwLock<HashMap<LobbyId, Lobby>>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self {
            lobbies: RwLock::new(HashMap::new()),
        }
    }

    fn read_guard(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<LobbyId, Lobby>>> {
        self.lobbies.read().map_err(|_| {
            LobbyError::StorageUnavailable {
                message: "membership store lock poisoned".to_string(),
            }
            .into()
        })
    }

    fn write_guard(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<LobbyId, Lobby>>> {
        self.lobbies.write().map_err(|_| {
            LobbyError::StorageUnavailable {
                message: "membership store lock poisoned".to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn create(&self, name: &str, capacity: usize, creator: UserId) -> Result<Lobby> {
        let lobby = Lobby {
            id: generate_lobby_id(),
            name: name.to_string(),
            members: vec![creator],
            capacity,
            status: GameStatus::Open,
            created_at: current_timestamp(),
        };

        let mut lobbies = self.write_guard()?;
        lobbies.insert(lobby.id, lobby.clone());
        debug!(lobby_id = %lobby.id, name, capacity, "lobby record inserted");
        Ok(lobby)
    }

    async fn get(&self, lobby_id: LobbyId) -> Result<Option<Lobby>> {
        let lobbies = self.read_guard()?;
        Ok(lobbies.get(&lobby_id).cloned())
    }

    async fn list_visible(&self) -> Result<Vec<Lobby>> {
        let lobbies = self.read_guard()?;
        // Removed lobbies are deleted on close, so every record is visible
        Ok(lobbies.values().cloned().collect())
    }

    async fn append_member(&self, lobby_id: LobbyId, user_id: UserId) -> Result<AppendOutcome> {
        let mut lobbies = self.write_guard()?;

        let lobby = match lobbies.get_mut(&lobby_id) {
            Some(lobby) => lobby,
            None => return Ok(AppendOutcome::NotFound),
        };

        if lobby.members.iter().any(|m| *m == user_id) {
            return Ok(AppendOutcome::AlreadyMember {
                members: lobby.members.clone(),
            });
        }

        if lobby.members.len() >= lobby.capacity {
            return Ok(AppendOutcome::AtCapacity);
        }

        lobby.members.push(user_id);
        Ok(AppendOutcome::Appended {
            members: lobby.members.clone(),
        })
    }

    async fn remove_member(&self, lobby_id: LobbyId, user_id: &str) -> Result<RemoveOutcome> {
        let mut lobbies = self.write_guard()?;

        let lobby = match lobbies.get_mut(&lobby_id) {
            Some(lobby) => lobby,
            None => return Ok(RemoveOutcome::NotFound),
        };

        lobby.members.retain(|m| m != user_id);
        let members = lobby.members.clone();

        if members.is_empty() {
            lobbies.remove(&lobby_id);
            debug!(lobby_id = %lobby_id, "empty lobby deleted after leave");
            return Ok(RemoveOutcome::Removed {
                members,
                lobby_deleted: true,
            });
        }

        Ok(RemoveOutcome::Removed {
            members,
            lobby_deleted: false,
        })
    }

    async fn set_status(
        &self,
        lobby_id: LobbyId,
        status: GameStatus,
    ) -> Result<Option<GameStatus>> {
        let mut lobbies = self.write_guard()?;

        Ok(lobbies.get_mut(&lobby_id).map(|lobby| {
            let previous = lobby.status;
            lobby.status = status;
            previous
        }))
    }

    async fn delete(&self, lobby_id: LobbyId) -> Result<bool> {
        let mut lobbies = self.write_guard()?;
        Ok(lobbies.remove(&lobby_id).is_some())
    }
}
