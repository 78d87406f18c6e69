//! Utility functions for the lobby orchestration service

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique lobby ID
pub fn generate_lobby_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Resolve the identity of this running instance.
///
/// Prefers an explicit `INSTANCE_ID`, then the container `HOSTNAME`,
/// then falls back to a generated identifier so registration still has
/// a stable value for the process lifetime.
pub fn detect_instance_id() -> String {
    std::env::var("INSTANCE_ID")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| format!("map-room-{}", Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_lobby_id();
        let id2 = generate_lobby_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_detect_instance_id_nonempty() {
        let id = detect_instance_id();
        assert!(!id.is_empty());
    }
}
