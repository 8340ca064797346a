use std::sync::Arc;
use std::time::Duration;

use quizlobby_core::events::BroadcastSink;

use crate::config::LobbyConfig;
use crate::janitor::{Janitor, JanitorHandle};
use crate::lifecycle::LobbyManager;
use crate::store::MemoryRoomStore;

/// Shared application state handed to transports and background tasks.
pub struct AppState {
    pub lobby: Arc<LobbyManager<MemoryRoomStore>>,
    pub notifications: Arc<BroadcastSink>,
    pub config: Arc<LobbyConfig>,
}

impl AppState {
    pub fn new(config: LobbyConfig) -> Self {
        let notifications = Arc::new(BroadcastSink::new(config.events.broadcast_capacity));
        let lobby = Arc::new(LobbyManager::new(
            MemoryRoomStore::new(),
            Arc::clone(&notifications) as _,
            config.rooms.clone(),
        ));
        Self {
            lobby,
            notifications,
            config: Arc::new(config),
        }
    }

    pub fn spawn_janitor(&self) -> JanitorHandle {
        Janitor::new(Duration::from_secs(self.config.rooms.sweep_interval_secs))
            .spawn(Arc::clone(&self.lobby))
    }
}
