use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use quizlobby_core::code::{self, MAX_CODE_ATTEMPTS};
use quizlobby_core::error::LobbyError;
use quizlobby_core::events::{Notification, NotificationSink, RoomEvent};
use quizlobby_core::player::PlayerScore;
use quizlobby_core::room::{Difficulty, Room, RoomConfig, RoomPhase, RoomSnapshot};

use crate::config::RoomsConfig;
use crate::sessions::{SessionBinding, SessionRegistry};
use crate::store::{Commit, RoomStore, StoreError};

/// Longest accepted player name.
const MAX_PLAYER_NAME_LEN: usize = 32;

/// Parameters for creating a room, as supplied by a transport.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoom {
    pub host_name: String,
    pub question_goal: u32,
    pub max_players: usize,
    pub difficulty: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Result of a join: the roster after the call, and whether this was an
/// idempotent rejoin of an already-seated name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinOutcome {
    pub players: Vec<String>,
    pub rejoined: bool,
}

/// Result of an answer submission. When the goal is reached the game ends
/// within the same operation and `winners` names the finisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub scores: Vec<PlayerScore>,
    pub game_ended: bool,
    pub winners: Vec<String>,
}

/// What a janitor sweep reclaimed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub examined: usize,
    pub removed_empty: usize,
    pub removed_idle: usize,
}

impl SweepStats {
    pub fn removed(&self) -> usize {
        self.removed_empty + self.removed_idle
    }
}

/// Operational counters for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LobbyStats {
    pub rooms: usize,
    pub players: usize,
    pub sessions: usize,
}

/// The room lifecycle state machine. All room mutations go through the
/// store's serialized-per-code entry point; events are handed to the sink
/// only after the mutation commits.
pub struct LobbyManager<S: RoomStore> {
    store: S,
    sessions: SessionRegistry,
    sink: Arc<dyn NotificationSink>,
    rooms_config: RoomsConfig,
}

impl<S: RoomStore> LobbyManager<S> {
    pub fn new(store: S, sink: Arc<dyn NotificationSink>, rooms_config: RoomsConfig) -> Self {
        Self {
            store,
            sessions: SessionRegistry::new(),
            sink,
            rooms_config,
        }
    }

    /// Create a room with the host seated. Runs an eager janitor sweep
    /// before rejecting at the live-room cap; code collisions retry
    /// against the live store up to the allocator's attempt budget.
    pub async fn create_room(&self, req: CreateRoom) -> Result<RoomSnapshot, LobbyError> {
        let host = validate_player_name(&req.host_name)?;
        if req.question_goal == 0 {
            return Err(LobbyError::InvalidParameter(
                "question goal must be a positive integer".to_string(),
            ));
        }
        if req.max_players == 0 {
            return Err(LobbyError::InvalidParameter(
                "max players must be a positive integer".to_string(),
            ));
        }
        let difficulty = Difficulty::parse(&req.difficulty).ok_or_else(|| {
            LobbyError::InvalidParameter(
                "difficulty must be one of: easy, medium, hard".to_string(),
            )
        })?;

        let config = RoomConfig {
            question_goal: req.question_goal,
            max_players: req.max_players,
            difficulty,
            categories: req.categories,
        };

        let mut attempts = 0;
        let mut swept = false;
        loop {
            let room = Room::new(code::generate_room_code(), &host, config.clone());
            let snapshot = room.snapshot();
            match self
                .store
                .create(room, self.rooms_config.max_rooms)
                .await
            {
                Ok(()) => {
                    tracing::info!(room = %snapshot.code, host = %host, "Room created");
                    return Ok(snapshot);
                },
                Err(StoreError::DuplicateCode) => {
                    attempts += 1;
                    if attempts >= MAX_CODE_ATTEMPTS {
                        tracing::warn!(attempts, "Room code allocation exhausted");
                        return Err(LobbyError::ExhaustedAttempts);
                    }
                },
                Err(StoreError::AtCapacity) => {
                    if swept {
                        return Err(LobbyError::CapacityExceeded);
                    }
                    let stats = self.sweep().await;
                    tracing::info!(
                        removed = stats.removed(),
                        "Eager sweep at room cap before rejecting creation"
                    );
                    swept = true;
                },
                Err(StoreError::NotFound) => {
                    // create() never reports NotFound.
                    return Err(LobbyError::ExhaustedAttempts);
                },
            }
        }
    }

    /// Seat a player. Joining under an already-seated name is an
    /// idempotent rejoin so a reconnecting client is not rejected as a
    /// duplicate. Joining after the game ended is allowed (play again).
    pub async fn join(&self, room_code: &str, player_name: &str) -> Result<JoinOutcome, LobbyError> {
        let player = validate_player_name(player_name)?;
        let result = self
            .store
            .mutate(room_code, |room| {
                if room.is_seated(&player) {
                    room.ensure_record(&player).touch();
                    room.touch();
                    let outcome = JoinOutcome {
                        players: room.players.clone(),
                        rejoined: true,
                    };
                    return (Ok((outcome, None)), Commit::Keep);
                }
                if room.players.len() >= room.config.max_players {
                    return (Err(LobbyError::RoomFull), Commit::Keep);
                }
                if room.phase == RoomPhase::InProgress {
                    return (Err(LobbyError::GameInProgress), Commit::Keep);
                }
                room.seat(&player);
                room.touch();
                let event = RoomEvent::PlayerJoined {
                    player: player.clone(),
                    players: room.players.clone(),
                };
                let outcome = JoinOutcome {
                    players: room.players.clone(),
                    rejoined: false,
                };
                (Ok((outcome, Some(event))), Commit::Keep)
            })
            .await
            .map_err(|_| room_not_found(room_code))?;

        let (outcome, event) = result?;
        if let Some(event) = event {
            tracing::info!(room = room_code, player = %player, "Player joined");
            self.notify(room_code, event);
        }
        Ok(outcome)
    }

    /// Remove a player from the roster. An emptied roster deletes the room
    /// within the same store mutation, so there is no window where an
    /// empty room lingers and could be rejoined.
    pub async fn leave(&self, room_code: &str, player_name: &str) -> Result<(), LobbyError> {
        let result = self
            .store
            .mutate(room_code, |room| {
                if !room.unseat(player_name) {
                    return (
                        Err(LobbyError::NotFound(format!(
                            "player {player_name} not found in room {room_code}"
                        ))),
                        Commit::Keep,
                    );
                }
                room.touch();
                let event = RoomEvent::PlayerLeft {
                    player: player_name.to_string(),
                    players: room.players.clone(),
                };
                if room.players.is_empty() {
                    (Ok((event, true)), Commit::Remove)
                } else {
                    (Ok((event, false)), Commit::Keep)
                }
            })
            .await
            .map_err(|_| room_not_found(room_code))?;

        let (event, room_deleted) = result?;
        tracing::info!(room = room_code, player = player_name, "Player left");
        self.notify(room_code, event);
        if room_deleted {
            tracing::info!(room = room_code, "Room deleted (roster empty)");
        }
        Ok(())
    }

    /// Begin a game. Every roster member gets a record (covers players who
    /// joined between creation and start) and the previous winners list is
    /// cleared.
    pub async fn start(&self, room_code: &str) -> Result<(), LobbyError> {
        let result = self
            .store
            .mutate(room_code, |room| {
                if room.phase == RoomPhase::InProgress {
                    return (Err(LobbyError::AlreadyStarted), Commit::Keep);
                }
                let roster = room.players.clone();
                for name in &roster {
                    room.ensure_record(name);
                }
                room.winners.clear();
                room.phase = RoomPhase::InProgress;
                room.touch();
                (
                    Ok(RoomEvent::GameStarted { players: roster }),
                    Commit::Keep,
                )
            })
            .await
            .map_err(|_| room_not_found(room_code))?;

        let event = result?;
        tracing::info!(room = room_code, "Game started");
        self.notify(room_code, event);
        Ok(())
    }

    /// Record an answer. A correct answer adds exactly 1 to the player's
    /// score; reaching the goal ends the game atomically within the same
    /// operation with the submitter as sole winner.
    pub async fn submit_answer(
        &self,
        room_code: &str,
        player_name: &str,
        correct: bool,
    ) -> Result<AnswerOutcome, LobbyError> {
        let result = self
            .store
            .mutate(room_code, |room| {
                if room.phase != RoomPhase::InProgress {
                    return (Err(LobbyError::GameNotStarted), Commit::Keep);
                }
                if !room.is_seated(player_name) {
                    return (
                        Err(LobbyError::NotFound(format!(
                            "player {player_name} not found in room {room_code}"
                        ))),
                        Commit::Keep,
                    );
                }

                let goal = room.config.question_goal;
                let record = room.ensure_record(player_name);
                if correct {
                    record.score += 1;
                }
                record.touch();
                let score = record.score;

                let game_ended = correct && score >= goal;
                let mut events = vec![RoomEvent::ScoreUpdated {
                    player: player_name.to_string(),
                    score,
                    game_ended,
                }];
                let mut winners = Vec::new();
                if game_ended {
                    winners.push(player_name.to_string());
                    room.finish_game(&winners);
                    events.push(RoomEvent::GameEnded {
                        winners: winners.clone(),
                    });
                }
                room.touch();

                let outcome = AnswerOutcome {
                    scores: room.scoreboard(),
                    game_ended,
                    winners,
                };
                (Ok((outcome, events)), Commit::Keep)
            })
            .await
            .map_err(|_| room_not_found(room_code))?;

        let (outcome, events) = result?;
        for event in events {
            self.notify(room_code, event);
        }
        if outcome.game_ended {
            tracing::info!(room = room_code, winner = player_name, "Game ended at goal");
        }
        Ok(outcome)
    }

    /// End the game with an explicit winner list. Order is preserved and
    /// may contain ties; duplicate names never double-increment wins.
    pub async fn end_game(
        &self,
        room_code: &str,
        winners: Vec<String>,
    ) -> Result<(), LobbyError> {
        let result = self
            .store
            .mutate(room_code, |room| {
                if room.phase != RoomPhase::InProgress {
                    return (Err(LobbyError::GameNotStarted), Commit::Keep);
                }
                room.finish_game(&winners);
                room.touch();
                (
                    Ok(RoomEvent::GameEnded {
                        winners: winners.clone(),
                    }),
                    Commit::Keep,
                )
            })
            .await
            .map_err(|_| room_not_found(room_code))?;

        let event = result?;
        tracing::info!(room = room_code, "Game ended");
        self.notify(room_code, event);
        Ok(())
    }

    /// Delete a room and all its player records. Idempotent: a missing
    /// room counts as already cleaned.
    pub async fn cleanup(&self, room_code: &str) {
        if self.store.remove(room_code).await {
            tracing::debug!(room = room_code, "Room cleaned up");
        }
    }

    /// Point-in-time view of a room.
    pub async fn room_snapshot(&self, room_code: &str) -> Result<RoomSnapshot, LobbyError> {
        self.store
            .get(room_code)
            .await
            .map(|room| room.snapshot())
            .ok_or_else(|| room_not_found(room_code))
    }

    /// Scoreboard for the current roster: descending score, ties stable in
    /// join order.
    pub async fn player_scores(&self, room_code: &str) -> Result<Vec<PlayerScore>, LobbyError> {
        self.store
            .get(room_code)
            .await
            .map(|room| room.scoreboard())
            .ok_or_else(|| room_not_found(room_code))
    }

    /// Bind a realtime connection to a seat. Membership is verified at
    /// bind time; a stale or forged join announcement surfaces as
    /// `NotFound`.
    pub async fn bind_session(
        &self,
        conn: &str,
        room_code: &str,
        player_name: &str,
    ) -> Result<(), LobbyError> {
        let room = self
            .store
            .get(room_code)
            .await
            .ok_or_else(|| room_not_found(room_code))?;
        if !room.is_seated(player_name) {
            return Err(LobbyError::NotFound(format!(
                "player {player_name} not found in room {room_code}"
            )));
        }
        self.sessions.bind(conn, room_code, player_name);
        tracing::debug!(conn, room = room_code, player = player_name, "Session bound");
        Ok(())
    }

    /// Realtime disconnect: release the binding and vacate the seat. A
    /// room or membership that disappeared since binding is tolerated.
    pub async fn disconnect(&self, conn: &str) -> Option<SessionBinding> {
        let binding = self.sessions.unbind(conn)?;
        if let Err(e) = self.leave(&binding.room, &binding.player).await {
            tracing::debug!(
                conn,
                room = %binding.room,
                player = %binding.player,
                error = %e,
                "Disconnect cleanup found seat already vacated"
            );
        }
        Some(binding)
    }

    pub fn lookup_session(&self, conn: &str) -> Option<SessionBinding> {
        self.sessions.lookup(conn)
    }

    /// One janitor pass: reclaim rooms with an empty roster or idle beyond
    /// the configured threshold. Each room is re-checked under its own
    /// mutation lock, so a room that sprang back to life between the
    /// listing and the removal is kept. Per-room failures never abort the
    /// rest of the sweep.
    pub async fn sweep(&self) -> SweepStats {
        let idle_timeout = Duration::from_secs(self.rooms_config.idle_timeout_secs);
        let mut stats = SweepStats::default();
        for room in self.store.list_all().await {
            stats.examined += 1;
            let verdict = self
                .store
                .mutate(&room.code, |room| {
                    // `String` rather than `&'static str`: a reference in
                    // the mutate return type trips rustc's Send proof for
                    // the opaque future when callers run inside spawn.
                    if room.players.is_empty() {
                        (Some("empty".to_string()), Commit::Remove)
                    } else if room.idle_for() >= idle_timeout {
                        (Some("idle".to_string()), Commit::Remove)
                    } else {
                        (None, Commit::Keep)
                    }
                })
                .await;
            match verdict {
                Ok(Some(reason)) => {
                    tracing::info!(room = %room.code, reason = %reason, "Janitor reclaimed room");
                    if reason == "empty" {
                        stats.removed_empty += 1;
                    } else {
                        stats.removed_idle += 1;
                    }
                },
                Ok(None) => {},
                Err(e) => {
                    // Already deleted by a concurrent leave or cleanup.
                    tracing::debug!(room = %room.code, error = %e, "Sweep skipped room");
                },
            }
        }
        stats
    }

    /// Operational counters.
    pub async fn stats(&self) -> LobbyStats {
        let rooms = self.store.list_all().await;
        LobbyStats {
            players: rooms.iter().map(|r| r.players.len()).sum(),
            rooms: rooms.len(),
            sessions: self.sessions.len(),
        }
    }

    fn notify(&self, room_code: &str, event: RoomEvent) {
        self.sink.notify(Notification::new(room_code, event));
    }
}

#[cfg(test)]
impl LobbyManager<crate::store::MemoryRoomStore> {
    /// Test-only: rewind a room's activity clock.
    pub(crate) async fn age(&self, code: &str, by: Duration) {
        self.store.age_room(code, by).await;
    }
}

fn room_not_found(room_code: &str) -> LobbyError {
    LobbyError::NotFound(format!("room {room_code} not found"))
}

/// Shared by create and join: trimmed, non-empty, bounded, printable.
fn validate_player_name(name: &str) -> Result<String, LobbyError> {
    let name = name.trim();
    if name.is_empty()
        || name.chars().count() > MAX_PLAYER_NAME_LEN
        || name.chars().any(char::is_control)
    {
        return Err(LobbyError::InvalidParameter(
            "invalid player name".to_string(),
        ));
    }
    Ok(name.to_string())
}
