//! Complete lobby lifecycle integration tests
//!
//! These tests walk lobbies through their whole life: creation, joining
//! up to capacity, leaving down to deletion, and the end/continue/close
//! status transitions.

use map_room::error::LobbyError;

use crate::fixtures::create_test_engine;

fn assert_not_found(err: anyhow::Error) {
    assert!(
        matches!(
            err.downcast_ref::<LobbyError>(),
            Some(LobbyError::LobbyNotFound { .. })
        ),
        "expected LobbyNotFound, got: {}",
        err
    );
}

#[tokio::test]
async fn test_alpha_lobby_walkthrough() {
    let (engine, _producer) = create_test_engine();

    // Create lobby "alpha" with capacity 2, creator u1
    let details = engine
        .create_lobby("alpha", 2, "u1".to_string())
        .await
        .unwrap();
    assert_eq!(details.members, vec!["u1".to_string()]);
    assert_eq!(details.current_size, 1);

    // u2 joins: Ok, size 2
    engine
        .join_lobby(details.id, "u2".to_string())
        .await
        .unwrap();
    let fetched = engine.lobby_detail(details.id).await.unwrap();
    assert_eq!(fetched.current_size, 2);

    // u3 is rejected, size stays 2
    let err = engine
        .join_lobby(details.id, "u3".to_string())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LobbyError>(),
        Some(LobbyError::CapacityExceeded { .. })
    ));
    let fetched = engine.lobby_detail(details.id).await.unwrap();
    assert_eq!(fetched.current_size, 2);

    // u1 leaves: Ok, size 1
    let outcome = engine.leave_lobby(details.id, "u1").await.unwrap();
    assert!(!outcome.lobby_deleted);
    let fetched = engine.lobby_detail(details.id).await.unwrap();
    assert_eq!(fetched.current_size, 1);

    // u2 leaves: lobby emptied and deleted
    let outcome = engine.leave_lobby(details.id, "u2").await.unwrap();
    assert!(outcome.lobby_deleted);

    assert_not_found(engine.lobby_detail(details.id).await.unwrap_err());

    println!("✅ Alpha lobby walkthrough test passed");
}

#[tokio::test]
async fn test_end_detail_close_walkthrough() {
    let (engine, producer) = create_test_engine();

    let details = engine
        .create_lobby("campaign", 3, "u1".to_string())
        .await
        .unwrap();
    engine
        .join_lobby(details.id, "u2".to_string())
        .await
        .unwrap();

    // Ending the game produces a non-empty per-player result set
    let result = engine.end_game(details.id).await.unwrap();
    assert_eq!(result.nations.len(), 2);
    assert_eq!(producer.invocation_count(), 1);

    // The ended lobby still resolves; only removal hides it
    let fetched = engine.lobby_detail(details.id).await.unwrap();
    assert_eq!(fetched.current_size, 2);

    // Close it, twice: Ok both times
    engine.close_game(details.id).await.unwrap();
    engine.close_game(details.id).await.unwrap();

    assert_not_found(engine.lobby_detail(details.id).await.unwrap_err());

    println!("✅ End/detail/close walkthrough test passed");
}

#[tokio::test]
async fn test_continue_restores_listing_visibility() {
    let (engine, _producer) = create_test_engine();

    let details = engine
        .create_lobby("rematch", 2, "u1".to_string())
        .await
        .unwrap();

    engine.end_game(details.id).await.unwrap();

    // Ended lobbies remain listed
    let lobbies = engine.list_lobbies().await.unwrap();
    assert_eq!(lobbies.len(), 1);

    engine.continue_game(details.id).await.unwrap();

    let lobbies = engine.list_lobbies().await.unwrap();
    assert_eq!(lobbies.len(), 1);
    assert_eq!(lobbies[0].name, "rematch");

    // Joining the reopened lobby works again
    engine
        .join_lobby(details.id, "u2".to_string())
        .await
        .unwrap();
    let fetched = engine.lobby_detail(details.id).await.unwrap();
    assert_eq!(fetched.current_size, 2);

    println!("✅ Continue visibility test passed");
}

#[tokio::test]
async fn test_rematch_cycle_end_continue_end() {
    let (engine, producer) = create_test_engine();

    let details = engine
        .create_lobby("marathon", 2, "u1".to_string())
        .await
        .unwrap();

    engine.end_game(details.id).await.unwrap();
    engine.continue_game(details.id).await.unwrap();
    engine.end_game(details.id).await.unwrap();

    assert_eq!(producer.invocation_count(), 2);

    let stats = engine.get_stats().await.unwrap();
    assert_eq!(stats.games_ended, 2);
    assert_eq!(stats.games_continued, 1);

    println!("✅ Rematch cycle test passed");
}
