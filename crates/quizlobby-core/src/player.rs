use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Per-room accumulated results for one player name. A record survives a
/// leave so a returning player keeps their score and wins, and it survives
/// repeated games in the same room; it is destroyed only with its room.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub score: u32,
    pub wins: u32,
    pub last_seen: Instant,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerRecord {
    pub fn new() -> Self {
        Self {
            score: 0,
            wins: 0,
            last_seen: Instant::now(),
        }
    }

    /// Refresh the activity timestamp (join, rejoin, or score update).
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }
}

/// Scoreboard row returned to transports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub name: String,
    pub score: u32,
    pub wins: u32,
}
