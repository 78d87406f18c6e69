//! Common types used throughout the lobby orchestration service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for users joining lobbies
pub type UserId = String;

/// Unique identifier for lobbies
pub type LobbyId = Uuid;

/// Unique identifier for games (a game is a lobby viewed after play starts)
pub type GameId = Uuid;

/// Identifier for a map territory held by a nation
pub type TerritoryId = u32;

/// Lifecycle status of a lobby/game
///
/// Wire codes match the storage convention: `Removed` is 0, `Open` is 1,
/// `Ended` is -1. Removed lobbies have no record; the variant exists for
/// the transition vocabulary and wire compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Removed,
    Open,
    Ended,
}

impl GameStatus {
    /// Numeric wire/storage code for this status
    pub fn code(&self) -> i16 {
        match self {
            GameStatus::Removed => 0,
            GameStatus::Open => 1,
            GameStatus::Ended => -1,
        }
    }

    /// Whether lobbies with this status appear in listings and lookups
    pub fn is_visible(&self) -> bool {
        !matches!(self, GameStatus::Removed)
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::Removed => write!(f, "Removed"),
            GameStatus::Open => write!(f, "Open"),
            GameStatus::Ended => write!(f, "Ended"),
        }
    }
}

/// A lobby record as owned by the membership store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lobby {
    pub id: LobbyId,
    pub name: String,
    /// Insertion-ordered, unique within the sequence
    pub members: Vec<UserId>,
    pub capacity: usize,
    pub status: GameStatus,
    pub created_at: DateTime<Utc>,
}

impl Lobby {
    /// Current member count
    pub fn current_size(&self) -> usize {
        self.members.len()
    }

    /// Whether another member fits under the capacity bound
    pub fn has_room(&self) -> bool {
        self.members.len() < self.capacity
    }

    pub fn summary(&self) -> LobbySummary {
        LobbySummary {
            name: self.name.clone(),
            current_size: self.members.len(),
            capacity: self.capacity,
        }
    }

    pub fn details(&self) -> LobbyDetails {
        LobbyDetails {
            id: self.id,
            name: self.name.clone(),
            current_size: self.members.len(),
            capacity: self.capacity,
            members: self.members.clone(),
        }
    }
}

/// Listing entry for a visible lobby
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbySummary {
    pub name: String,
    pub current_size: usize,
    pub capacity: usize,
}

/// Full lobby view including the membership list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyDetails {
    pub id: LobbyId,
    pub name: String,
    pub current_size: usize,
    pub capacity: usize,
    pub members: Vec<UserId>,
}

/// Request body for creating a lobby
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLobbyRequest {
    pub name: String,
    pub capacity: usize,
    pub user_id: UserId,
}

/// Request body for join/leave operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRequest {
    pub user_id: UserId,
}

/// Per-participant outcome produced when a game ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationResult {
    pub user_id: UserId,
    pub population: u64,
    pub territories: Vec<TerritoryId>,
}

/// End-of-game snapshot, one record per participant
///
/// Ephemeral: returned in the `end_game` response and not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub nations: Vec<NationResult>,
}

/// Outcome of a leave operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// True when the leave emptied the lobby and the record was deleted
    pub lobby_deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GameStatus::Removed.code(), 0);
        assert_eq!(GameStatus::Open.code(), 1);
        assert_eq!(GameStatus::Ended.code(), -1);
    }

    #[test]
    fn test_status_visibility() {
        assert!(!GameStatus::Removed.is_visible());
        assert!(GameStatus::Open.is_visible());
        assert!(GameStatus::Ended.is_visible());
    }

    #[test]
    fn test_lobby_room_accounting() {
        let lobby = Lobby {
            id: Uuid::new_v4(),
            name: "alpha".to_string(),
            members: vec!["u1".to_string()],
            capacity: 2,
            status: GameStatus::Open,
            created_at: Utc::now(),
        };

        assert_eq!(lobby.current_size(), 1);
        assert!(lobby.has_room());

        let summary = lobby.summary();
        assert_eq!(summary.current_size, 1);
        assert_eq!(summary.capacity, 2);
    }
}
