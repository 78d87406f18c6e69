//! End-of-game result production
//!
//! The lifecycle engine depends on a pluggable producer so the random
//! generation used in live play can be swapped for a deterministic
//! implementation in tests.

use crate::types::{GameResult, NationResult, TerritoryId, UserId};
use rand::Rng;

/// Capability for producing the end-of-game snapshot.
///
/// Implementations must yield exactly one record per participant, in
/// participant order.
#[cfg_attr(test, mockall::automock)]
pub trait ResultProducer: Send + Sync {
    fn produce(&self, members: &[UserId]) -> GameResult;
}

/// Producer that rolls population and territory holdings for each nation.
///
/// Ranges follow the game's map model: populations between ten thousand
/// and a quarter million, 10 to 50 territories each, drawn from the 400
/// territories on the map.
#[derive(Debug, Clone, Default)]
pub struct GeneratedMapProducer;

impl GeneratedMapProducer {
    pub fn new() -> Self {
        Self
    }
}

impl ResultProducer for GeneratedMapProducer {
    fn produce(&self, members: &[UserId]) -> GameResult {
        let mut rng = rand::rng();

        let nations = members
            .iter()
            .map(|user_id| {
                let territory_count = rng.random_range(10..=50);
                let territories: Vec<TerritoryId> = (0..territory_count)
                    .map(|_| rng.random_range(1..=400))
                    .collect();

                NationResult {
                    user_id: user_id.clone(),
                    population: rng.random_range(10_000..=250_000),
                    territories,
                }
            })
            .collect();

        GameResult { nations }
    }
}

/// Producer returning a fixed, predictable snapshot. Intended for tests
/// and local tooling that needs stable output.
#[derive(Debug, Clone, Default)]
pub struct FixedResultProducer;

impl FixedResultProducer {
    pub fn new() -> Self {
        Self
    }
}

impl ResultProducer for FixedResultProducer {
    fn produce(&self, members: &[UserId]) -> GameResult {
        let nations = members
            .iter()
            .enumerate()
            .map(|(i, user_id)| NationResult {
                user_id: user_id.clone(),
                population: 10_000 * (i as u64 + 1),
                territories: vec![i as TerritoryId + 1],
            })
            .collect();

        GameResult { nations }
    }
}
