use std::collections::HashMap;
use std::sync::Mutex;

/// Binding between a live realtime connection and the seat it represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    pub room: String,
    pub player: String,
}

/// Maps connection ids to their room/player binding. Serialized by its own
/// lock, independent of the room store; it never mutates room state
/// directly. Membership is validated by the lifecycle manager at bind
/// time, and again by disconnect handling at delivery time.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionBinding>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crate-internal: bindings are created through the lifecycle
    /// manager's `bind_session`, which verifies roster membership first.
    pub(crate) fn bind(&self, conn: &str, room: &str, player: &str) {
        self.sessions.lock().unwrap().insert(
            conn.to_string(),
            SessionBinding {
                room: room.to_string(),
                player: player.to_string(),
            },
        );
    }

    pub fn unbind(&self, conn: &str) -> Option<SessionBinding> {
        self.sessions.lock().unwrap().remove(conn)
    }

    pub fn lookup(&self, conn: &str) -> Option<SessionBinding> {
        self.sessions.lock().unwrap().get(conn).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().unwrap().is_empty()
    }
}
