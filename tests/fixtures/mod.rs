//! Test fixtures and helper implementations for integration testing

use map_room::lobby::engine::LobbyEngine;
use map_room::lobby::results::ResultProducer;
use map_room::store::InMemoryMembershipStore;
use map_room::types::{GameResult, NationResult, TerritoryId, UserId};
use std::sync::{Arc, Mutex};

/// Result producer that returns a fixed snapshot and records how many
/// times it was invoked
#[derive(Debug, Default)]
pub struct RecordingResultProducer {
    invocations: Arc<Mutex<usize>>,
}

impl RecordingResultProducer {
    pub fn new() -> Self {
        Self {
            invocations: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of times `produce` has been called
    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().map(|n| *n).unwrap_or(0)
    }
}

impl ResultProducer for RecordingResultProducer {
    fn produce(&self, members: &[UserId]) -> GameResult {
        if let Ok(mut invocations) = self.invocations.lock() {
            *invocations += 1;
        }

        GameResult {
            nations: members
                .iter()
                .enumerate()
                .map(|(i, user_id)| NationResult {
                    user_id: user_id.clone(),
                    population: 50_000,
                    territories: vec![i as TerritoryId + 1],
                })
                .collect(),
        }
    }
}

/// Build an engine over a fresh in-memory store with a recording producer
pub fn create_test_engine() -> (LobbyEngine, Arc<RecordingResultProducer>) {
    let producer = Arc::new(RecordingResultProducer::new());
    let engine = LobbyEngine::new(Arc::new(InMemoryMembershipStore::new()), producer.clone());
    (engine, producer)
}

/// Sequential user identifiers for populating lobbies
pub fn user_ids(count: usize) -> Vec<UserId> {
    (1..=count).map(|i| format!("user_{}", i)).collect()
}
