use serde::Serialize;
use tokio::sync::broadcast;

/// Logical lifecycle event emitted after a room mutation commits. Payloads
/// carry enough roster context for a realtime transport to update clients
/// without a follow-up read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    PlayerJoined {
        player: String,
        players: Vec<String>,
    },
    PlayerLeft {
        player: String,
        players: Vec<String>,
    },
    GameStarted {
        players: Vec<String>,
    },
    ScoreUpdated {
        player: String,
        score: u32,
        game_ended: bool,
    },
    GameEnded {
        winners: Vec<String>,
    },
}

/// Envelope handed to sinks: the room the event belongs to plus the
/// emission time as seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub room: String,
    pub timestamp: u64,
    pub event: RoomEvent,
}

impl Notification {
    pub fn new(room: &str, event: RoomEvent) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            room: room.to_string(),
            timestamp,
            event,
        }
    }
}

/// Delivery boundary toward realtime transports. State is committed before
/// `notify` is called, so a failing or slow sink can never corrupt a room.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Fan-out sink backed by a tokio broadcast channel. Send failures mean no
/// subscriber is listening, which is fine.
pub struct BroadcastSink {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}

/// Sink that drops everything. Useful for tools and tests that do not care
/// about broadcasts.
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: Notification) {}
}
