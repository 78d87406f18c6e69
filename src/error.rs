//! Error types for the lobby orchestration service
//!
//! This module defines all error types using anyhow for consistent error
//! handling throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific lobby and registry scenarios
///
/// `LobbyNotFound` and `CapacityExceeded` are expected business outcomes
/// that the service facade maps to response codes. `StorageUnavailable`
/// and `RegistryUnavailable` are transient infrastructure failures and
/// must never be collapsed into a business outcome.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    #[error("Lobby not found: {lobby_id}")]
    LobbyNotFound { lobby_id: String },

    #[error("Lobby is at capacity: {lobby_id}")]
    CapacityExceeded { lobby_id: String },

    #[error("Conflicting lobby operation: {message}")]
    Conflict { message: String },

    #[error("Membership storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Discovery registry unavailable: {message}")]
    RegistryUnavailable { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
