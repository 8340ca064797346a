use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::player::{PlayerRecord, PlayerScore};

/// Question difficulty chosen at room creation. Validated here, otherwise
/// opaque to the lifecycle logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// Settings fixed at room creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Score threshold that ends the game.
    pub question_goal: u32,
    pub max_players: usize,
    pub difficulty: Difficulty,
    /// Category identifiers; not interpreted by the lobby.
    pub categories: Vec<String>,
}

/// Current lifecycle phase of a room. Transitions only
/// Waiting → InProgress → Ended, with Ended returning to play on the next
/// start ("play again").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomPhase {
    Waiting,
    InProgress,
    Ended,
}

/// Authoritative state for one live room. Mutated only through the store's
/// serialized-per-code mutation entry point.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: String,
    /// Player who created the room; set once.
    pub host: String,
    /// Seated players in join order. Names are unique within a room.
    pub players: Vec<String>,
    pub config: RoomConfig,
    pub phase: RoomPhase,
    /// Winners of the most recently completed game; cleared on next start.
    pub winners: Vec<String>,
    /// Accumulated results keyed by player name. Deleted with the room.
    pub records: HashMap<String, PlayerRecord>,
    pub created_at: Instant,
    pub last_active: Instant,
}

impl Room {
    /// Create a room with the host already seated and a zeroed record.
    pub fn new(code: String, host: &str, config: RoomConfig) -> Self {
        let now = Instant::now();
        let mut records = HashMap::new();
        records.insert(host.to_string(), PlayerRecord::new());
        Self {
            code,
            host: host.to_string(),
            players: vec![host.to_string()],
            config,
            phase: RoomPhase::Waiting,
            winners: Vec::new(),
            records,
            created_at: now,
            last_active: now,
        }
    }

    pub fn is_seated(&self, name: &str) -> bool {
        self.players.iter().any(|p| p == name)
    }

    /// Append a player to the roster and make sure they have a record.
    /// Callers check capacity and phase first.
    pub fn seat(&mut self, name: &str) {
        if !self.is_seated(name) {
            self.players.push(name.to_string());
        }
        self.ensure_record(name).touch();
    }

    /// Remove a player from the roster. Their record stays so a rejoin
    /// keeps score and wins. Returns false if the player was not seated.
    pub fn unseat(&mut self, name: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p != name);
        self.players.len() != before
    }

    pub fn ensure_record(&mut self, name: &str) -> &mut PlayerRecord {
        self.records.entry(name.to_string()).or_default()
    }

    /// Refresh the activity timestamp; called by every mutating operation.
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    /// End the current game: record the winners in the order given and
    /// increment wins once per unique listed name, even when the list
    /// contains duplicates.
    pub fn finish_game(&mut self, winners: &[String]) {
        self.phase = RoomPhase::Ended;
        self.winners = winners.to_vec();
        let mut seen = HashSet::new();
        for winner in winners {
            if seen.insert(winner.as_str()) {
                self.ensure_record(winner).wins += 1;
            }
        }
    }

    /// Scoreboard for the current roster, descending by score. The sort is
    /// stable, so equal scores keep join order between calls.
    pub fn scoreboard(&self) -> Vec<PlayerScore> {
        let mut rows: Vec<PlayerScore> = self
            .players
            .iter()
            .map(|name| {
                let record = self.records.get(name);
                PlayerScore {
                    name: name.clone(),
                    score: record.map_or(0, |r| r.score),
                    wins: record.map_or(0, |r| r.wins),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        rows
    }

    /// Read model handed to transports.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            host: self.host.clone(),
            players: self.players.clone(),
            question_goal: self.config.question_goal,
            max_players: self.config.max_players,
            difficulty: self.config.difficulty,
            categories: self.config.categories.clone(),
            phase: self.phase,
            winners: self.winners.clone(),
            idle_secs: self.idle_for().as_secs(),
            age_secs: self.created_at.elapsed().as_secs(),
        }
    }
}

/// Point-in-time view of a room for responses and broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSnapshot {
    pub code: String,
    pub host: String,
    pub players: Vec<String>,
    pub question_goal: u32,
    pub max_players: usize,
    pub difficulty: Difficulty,
    pub categories: Vec<String>,
    pub phase: RoomPhase,
    pub winners: Vec<String>,
    pub idle_secs: u64,
    pub age_secs: u64,
}
