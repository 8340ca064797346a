use quizlobby_server::config::LobbyConfig;
use quizlobby_server::lifecycle::CreateRoom;
use quizlobby_server::state::AppState;

/// App state with default configuration and a live broadcast sink.
pub fn test_state() -> AppState {
    AppState::new(LobbyConfig::default())
}

pub fn test_state_with(mutate: impl FnOnce(&mut LobbyConfig)) -> AppState {
    let mut config = LobbyConfig::default();
    mutate(&mut config);
    AppState::new(config)
}

pub fn create_request(host: &str) -> CreateRoom {
    CreateRoom {
        host_name: host.to_string(),
        question_goal: 3,
        max_players: 4,
        difficulty: "easy".to_string(),
        categories: vec!["science".to_string()],
    }
}
