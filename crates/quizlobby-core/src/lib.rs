pub mod code;
pub mod error;
pub mod events;
pub mod player;
pub mod room;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::Mutex;

    use crate::events::{Notification, NotificationSink, RoomEvent};
    use crate::room::{Difficulty, Room, RoomConfig};

    /// Sink that records every notification for later assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        notifications: Mutex<Vec<Notification>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Drain and return everything recorded so far.
        pub fn take(&self) -> Vec<Notification> {
            std::mem::take(&mut self.notifications.lock().unwrap())
        }

        /// The recorded events without their envelopes, in emission order.
        pub fn events(&self) -> Vec<RoomEvent> {
            self.notifications
                .lock()
                .unwrap()
                .iter()
                .map(|n| n.event.clone())
                .collect()
        }
    }

    impl NotificationSink for RecordingSink {
        fn notify(&self, notification: Notification) {
            self.notifications.lock().unwrap().push(notification);
        }
    }

    /// Room settings with the given goal and capacity, easy difficulty.
    pub fn make_config(question_goal: u32, max_players: usize) -> RoomConfig {
        RoomConfig {
            question_goal,
            max_players,
            difficulty: Difficulty::Easy,
            categories: Vec::new(),
        }
    }

    /// A fresh room with default settings (goal 10, capacity 8).
    pub fn make_room(code: &str, host: &str) -> Room {
        Room::new(code.to_string(), host, make_config(10, 8))
    }
}
