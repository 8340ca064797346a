#[allow(dead_code)]
mod common;

use quizlobby_core::error::LobbyError;
use quizlobby_core::events::RoomEvent;
use quizlobby_core::room::RoomPhase;

use common::{create_request, test_state, test_state_with};

#[tokio::test]
async fn full_game_to_the_goal() {
    let state = test_state();
    let lobby = &state.lobby;

    // Host creates a 2-seat room with a goal of 3.
    let mut req = create_request("alice");
    req.max_players = 2;
    let room = lobby.create_room(req).await.unwrap();
    assert_eq!(room.players, vec!["alice"]);
    assert_eq!(room.question_goal, 3);

    let joined = lobby.join(&room.code, "bob").await.unwrap();
    assert_eq!(joined.players, vec!["alice", "bob"]);

    lobby.start(&room.code).await.unwrap();

    lobby.submit_answer(&room.code, "bob", true).await.unwrap();
    lobby.submit_answer(&room.code, "alice", true).await.unwrap();
    lobby.submit_answer(&room.code, "bob", false).await.unwrap();
    lobby.submit_answer(&room.code, "bob", true).await.unwrap();
    let last = lobby.submit_answer(&room.code, "bob", true).await.unwrap();

    assert!(last.game_ended);
    assert_eq!(last.winners, vec!["bob"]);

    let snap = lobby.room_snapshot(&room.code).await.unwrap();
    assert_eq!(snap.phase, RoomPhase::Ended);
    assert_eq!(snap.winners, vec!["bob"]);

    // Scoreboard: descending by score, bob 3 ahead of alice 1.
    let scores = lobby.player_scores(&room.code).await.unwrap();
    assert_eq!(scores[0].name, "bob");
    assert_eq!(scores[0].score, 3);
    assert_eq!(scores[0].wins, 1);
    assert_eq!(scores[1].name, "alice");
    assert_eq!(scores[1].score, 1);
    assert_eq!(scores[1].wins, 0);
}

#[tokio::test]
async fn events_reach_broadcast_subscribers() {
    let state = test_state();
    let lobby = &state.lobby;
    let mut rx = state.notifications.subscribe();

    let room = lobby.create_room(create_request("alice")).await.unwrap();
    lobby.join(&room.code, "bob").await.unwrap();

    let n = rx.recv().await.unwrap();
    assert_eq!(n.room, room.code);
    match n.event {
        RoomEvent::PlayerJoined { player, players } => {
            assert_eq!(player, "bob");
            assert_eq!(players, vec!["alice", "bob"]);
        },
        other => panic!("Expected PlayerJoined, got: {other:?}"),
    }

    lobby.leave(&room.code, "bob").await.unwrap();
    let n = rx.recv().await.unwrap();
    match n.event {
        RoomEvent::PlayerLeft { player, players } => {
            assert_eq!(player, "bob");
            assert_eq!(players, vec!["alice"]);
        },
        other => panic!("Expected PlayerLeft, got: {other:?}"),
    }
}

#[tokio::test]
async fn notification_envelope_serializes_for_the_wire() {
    let state = test_state();
    let lobby = &state.lobby;
    let mut rx = state.notifications.subscribe();

    let room = lobby.create_room(create_request("alice")).await.unwrap();
    lobby.start(&room.code).await.unwrap();

    let n = rx.recv().await.unwrap();
    let json = serde_json::to_value(&n).unwrap();
    assert_eq!(json["room"], room.code.as_str());
    assert_eq!(json["event"]["type"], "game_started");
    assert_eq!(json["event"]["players"][0], "alice");
    assert!(json["timestamp"].as_u64().unwrap() >= 1_704_067_200);
}

#[tokio::test]
async fn room_cap_applies_after_eager_sweep() {
    let state = test_state_with(|cfg| cfg.rooms.max_rooms = 1);
    let lobby = &state.lobby;

    lobby.create_room(create_request("alice")).await.unwrap();
    // The only room is live and busy, so the sweep frees nothing.
    assert_eq!(
        lobby.create_room(create_request("bob")).await,
        Err(LobbyError::CapacityExceeded)
    );
}

#[tokio::test]
async fn disconnect_of_last_player_removes_the_room() {
    let state = test_state();
    let lobby = &state.lobby;

    let room = lobby.create_room(create_request("alice")).await.unwrap();
    lobby.bind_session("conn-1", &room.code, "alice").await.unwrap();

    lobby.disconnect("conn-1").await.unwrap();
    assert!(matches!(
        lobby.room_snapshot(&room.code).await,
        Err(LobbyError::NotFound(_))
    ));
    assert_eq!(lobby.stats().await.sessions, 0);
}

#[tokio::test]
async fn snapshot_reflects_configuration() {
    let state = test_state();
    let room = state
        .lobby
        .create_room(create_request("alice"))
        .await
        .unwrap();

    let snap = state.lobby.room_snapshot(&room.code).await.unwrap();
    assert_eq!(snap.host, "alice");
    assert_eq!(snap.max_players, 4);
    assert_eq!(snap.categories, vec!["science"]);
    assert_eq!(snap.phase, RoomPhase::Waiting);
    assert!(snap.winners.is_empty());
    assert_eq!(snap.idle_secs, 0);
}

#[tokio::test]
async fn distinct_rooms_are_isolated() {
    let state = test_state();
    let lobby = &state.lobby;

    let a = lobby.create_room(create_request("alice")).await.unwrap();
    let b = lobby.create_room(create_request("bob")).await.unwrap();
    assert_ne!(a.code, b.code);

    lobby.start(&a.code).await.unwrap();
    // Room B is unaffected by room A's game.
    assert_eq!(
        lobby.room_snapshot(&b.code).await.unwrap().phase,
        RoomPhase::Waiting
    );
    let joined = lobby.join(&b.code, "carol").await.unwrap();
    assert_eq!(joined.players, vec!["bob", "carol"]);
}
