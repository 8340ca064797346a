use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::lifecycle::LobbyManager;
use crate::store::RoomStore;

/// Background task that periodically reclaims empty and idle rooms.
pub struct Janitor {
    interval: Duration,
}

/// Handle to a running janitor. `stop` requests shutdown and waits for an
/// in-flight sweep to finish.
pub struct JanitorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Janitor {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Spawn the sweep loop. The first sweep runs after one full interval,
    /// not immediately, so startup is not penalized on large stores.
    pub fn spawn<S: RoomStore>(self, lobby: Arc<LobbyManager<S>>) -> JanitorHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let interval = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await; // first tick fires immediately
            tracing::info!(interval_secs = interval.as_secs(), "Janitor started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let stats = lobby.sweep().await;
                        if stats.removed() > 0 {
                            tracing::info!(
                                examined = stats.examined,
                                removed_empty = stats.removed_empty,
                                removed_idle = stats.removed_idle,
                                "Janitor sweep complete"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::info!("Janitor stopping");
                        break;
                    }
                }
            }
        });
        JanitorHandle { shutdown, task }
    }
}

impl JanitorHandle {
    pub async fn stop(self) {
        // Receiver dropping with the task is fine; send errors only then.
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Janitor task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quizlobby_core::events::NullSink;

    use crate::config::RoomsConfig;
    use crate::lifecycle::CreateRoom;
    use crate::store::MemoryRoomStore;

    fn lobby(idle_timeout_secs: u64) -> Arc<LobbyManager<MemoryRoomStore>> {
        Arc::new(LobbyManager::new(
            MemoryRoomStore::new(),
            Arc::new(NullSink),
            RoomsConfig {
                idle_timeout_secs,
                ..RoomsConfig::default()
            },
        ))
    }

    fn request(host: &str) -> CreateRoom {
        CreateRoom {
            host_name: host.to_string(),
            question_goal: 5,
            max_players: 4,
            difficulty: "medium".to_string(),
            categories: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_on_interval() {
        let lobby = lobby(600);
        let snap = lobby.create_room(request("alice")).await.unwrap();
        lobby.age(&snap.code, Duration::from_secs(700)).await;

        let handle = Janitor::new(Duration::from_secs(60)).spawn(Arc::clone(&lobby));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(lobby.room_snapshot(&snap.code).await.is_err());
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_terminates_the_loop() {
        let lobby = lobby(600);
        let handle = Janitor::new(Duration::from_secs(60)).spawn(Arc::clone(&lobby));
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_rooms_survive_sweeps() {
        let lobby = lobby(600);
        let snap = lobby.create_room(request("alice")).await.unwrap();

        let handle = Janitor::new(Duration::from_secs(60)).spawn(Arc::clone(&lobby));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(lobby.room_snapshot(&snap.code).await.is_ok());
        handle.stop().await;
    }
}
