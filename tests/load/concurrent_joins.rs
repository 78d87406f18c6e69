//! Concurrency stress tests for lobby membership
//!
//! These tests validate the capacity invariant and update atomicity when
//! many joins and leaves target the same lobby at once.

use map_room::error::LobbyError;
use std::collections::HashSet;
use std::sync::Arc;

use crate::fixtures::{create_test_engine, user_ids};

#[tokio::test]
async fn test_concurrent_joins_respect_capacity() {
    let (engine, _producer) = create_test_engine();
    let engine = Arc::new(engine);

    // Capacity 5 with the creator already seated leaves 4 free slots
    let details = engine
        .create_lobby("contested", 5, "creator".to_string())
        .await
        .unwrap();

    let contenders = 16;
    let handles: Vec<_> = user_ids(contenders)
        .into_iter()
        .map(|user| {
            let engine = engine.clone();
            let lobby_id = details.id;
            tokio::spawn(async move { engine.join_lobby(lobby_id, user).await })
        })
        .collect();

    let results = futures::future::join_all(handles).await;

    let mut successes = 0;
    let mut capacity_rejections = 0;
    for result in results {
        match result.expect("join task panicked") {
            Ok(()) => successes += 1,
            Err(e) => {
                assert!(
                    matches!(
                        e.downcast_ref::<LobbyError>(),
                        Some(LobbyError::CapacityExceeded { .. })
                    ),
                    "unexpected join failure: {}",
                    e
                );
                capacity_rejections += 1;
            }
        }
    }

    assert_eq!(successes, 4, "exactly the free slots may be won");
    assert_eq!(capacity_rejections, contenders - 4);

    let fetched = engine.lobby_detail(details.id).await.unwrap();
    assert_eq!(fetched.current_size, 5);
    assert!(fetched.current_size <= fetched.capacity);
}

#[tokio::test]
async fn test_concurrent_joins_and_leaves_lose_no_updates() {
    let (engine, _producer) = create_test_engine();
    let engine = Arc::new(engine);

    // Seed with creator + three members, then race three leaves against
    // four joins. Capacity 8 keeps every operation admissible, so the
    // final membership is exactly determined.
    let details = engine
        .create_lobby("churn", 8, "creator".to_string())
        .await
        .unwrap();
    for user in ["m1", "m2", "m3"] {
        engine
            .join_lobby(details.id, user.to_string())
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for user in ["m1", "m2", "m3"] {
        let engine = engine.clone();
        let lobby_id = details.id;
        handles.push(tokio::spawn(async move {
            engine.leave_lobby(lobby_id, user).await.map(|_| ())
        }));
    }
    for user in ["j1", "j2", "j3", "j4"] {
        let engine = engine.clone();
        let lobby_id = details.id;
        handles.push(tokio::spawn(async move {
            engine.join_lobby(lobby_id, user.to_string()).await
        }));
    }

    for result in futures::future::join_all(handles).await {
        result.expect("membership task panicked").unwrap();
    }

    // 4 seated - 3 leaves + 4 joins = 5 members, no duplicates
    let fetched = engine.lobby_detail(details.id).await.unwrap();
    assert_eq!(fetched.current_size, 5);

    let unique: HashSet<_> = fetched.members.iter().collect();
    assert_eq!(unique.len(), fetched.members.len());
    assert!(fetched.members.contains(&"creator".to_string()));
    for user in ["j1", "j2", "j3", "j4"] {
        assert!(fetched.members.contains(&user.to_string()));
    }
}

#[tokio::test]
async fn test_parallel_operations_across_many_lobbies() {
    let (engine, _producer) = create_test_engine();
    let engine = Arc::new(engine);

    let lobby_count = 50;
    let handles: Vec<_> = (0..lobby_count)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let details = engine
                    .create_lobby(&format!("lobby_{}", i), 4, format!("owner_{}", i))
                    .await?;
                engine
                    .join_lobby(details.id, format!("guest_{}", i))
                    .await?;
                engine.end_game(details.id).await?;
                Ok::<_, anyhow::Error>(details.id)
            })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    for result in results {
        result.expect("lobby task panicked").unwrap();
    }

    let stats = engine.get_stats().await.unwrap();
    assert_eq!(stats.lobbies_created, lobby_count);
    assert_eq!(stats.games_ended, lobby_count);
    assert_eq!(stats.active_lobbies, lobby_count as usize);
    assert_eq!(stats.members_waiting, (lobby_count * 2) as usize);
}
