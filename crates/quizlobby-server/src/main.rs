use quizlobby_server::config::LobbyConfig;
use quizlobby_server::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Quizlobby server starting");

    let config = LobbyConfig::load();
    config.validate();

    let state = AppState::new(config);
    let janitor = state.spawn_janitor();

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }

    janitor.stop().await;
    tracing::info!(
        rooms = state.lobby.stats().await.rooms,
        "Quizlobby server stopped"
    );
}
