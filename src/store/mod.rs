//! Membership storage for lobby records
//!
//! The store exclusively owns lobby records. Every mutating operation is
//! single-record atomic: callers never observe a partially updated lobby,
//! and the capacity check is folded into the append itself.

pub mod memory;

// Re-export commonly used types
pub use memory::InMemoryMembershipStore;

use crate::error::Result;
use crate::types::{GameStatus, Lobby, LobbyId, UserId};
use async_trait::async_trait;

/// Outcome of an atomic member append
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Member appended; holds the updated membership list
    Appended { members: Vec<UserId> },
    /// User was already a member; membership unchanged
    AlreadyMember { members: Vec<UserId> },
    /// Appending would exceed the lobby capacity
    AtCapacity,
    /// No visible lobby with that ID
    NotFound,
}

/// Outcome of an atomic member removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Removal applied (a no-op for non-members); holds the updated list.
    /// `lobby_deleted` is set when the removal emptied the lobby and the
    /// record was deleted as part of the same operation.
    Removed {
        members: Vec<UserId>,
        lobby_deleted: bool,
    },
    /// No visible lobby with that ID
    NotFound,
}

/// Keyed storage for lobby records with atomic membership operations.
///
/// Errors from these methods represent transient storage failures only;
/// business outcomes (absent lobby, full lobby) are expressed in the
/// outcome enums so callers can map them without downcasting.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Insert a new lobby with status `Open` and the creator as sole member
    async fn create(&self, name: &str, capacity: usize, creator: UserId) -> Result<Lobby>;

    /// Fetch a visible lobby by ID
    async fn get(&self, lobby_id: LobbyId) -> Result<Option<Lobby>>;

    /// All lobbies whose status is not `Removed`
    async fn list_visible(&self) -> Result<Vec<Lobby>>;

    /// Append a member if the lobby exists, the user is not already a
    /// member, and the post-append count stays within capacity. The
    /// existence, duplicate and capacity checks happen in the same atomic
    /// step as the append.
    async fn append_member(&self, lobby_id: LobbyId, user_id: UserId) -> Result<AppendOutcome>;

    /// Remove a member; if the lobby becomes empty the record is deleted
    /// within the same operation.
    async fn remove_member(&self, lobby_id: LobbyId, user_id: &str) -> Result<RemoveOutcome>;

    /// Set the lobby status, returning the previous status, or `None` if
    /// the lobby is absent.
    async fn set_status(&self, lobby_id: LobbyId, status: GameStatus)
        -> Result<Option<GameStatus>>;

    /// Delete the lobby record. Returns whether a record existed.
    async fn delete(&self, lobby_id: LobbyId) -> Result<bool>;
}
