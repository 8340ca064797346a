use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use quizlobby_core::room::Room;

/// Storage-level failures, distinct from business-rule errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    NotFound,
    DuplicateCode,
    AtCapacity,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "room not found"),
            Self::DuplicateCode => write!(f, "room code already in use"),
            Self::AtCapacity => write!(f, "room store at capacity"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Verdict returned by a mutation closure: keep the room, or delete it as
/// part of the same linearized step. Leave-empties-room uses `Remove` so
/// there is no window where an emptied room could be rejoined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Keep,
    Remove,
}

/// Authoritative room storage. The central guarantee is at most one
/// in-flight mutation per room code at a time; mutations on different
/// codes proceed independently. Backends are interchangeable at
/// construction time as long as they honor that contract.
pub trait RoomStore: Send + Sync + 'static {
    /// Insert a new room. Code uniqueness and the global live-room cap are
    /// checked atomically under a single serialization point, so
    /// check-then-act races cannot violate either invariant.
    fn create(
        &self,
        room: Room,
        max_rooms: usize,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Point-in-time copy of a room, if live.
    fn get(&self, code: &str) -> impl Future<Output = Option<Room>> + Send;

    /// Apply a transformation under the room's exclusive mutation right.
    /// The closure runs without any I/O in scope; its `Commit` verdict may
    /// delete the room within the same linearized step.
    fn mutate<T, F>(&self, code: &str, f: F) -> impl Future<Output = Result<T, StoreError>> + Send
    where
        T: Send,
        F: FnOnce(&mut Room) -> (T, Commit) + Send;

    /// Delete a room. Returns false if it was already gone.
    fn remove(&self, code: &str) -> impl Future<Output = bool> + Send;

    /// Copies of all live rooms.
    fn list_all(&self) -> impl Future<Output = Vec<Room>> + Send;

    /// Number of live rooms.
    fn count(&self) -> impl Future<Output = usize> + Send;
}

/// A room plus its deletion tombstone. A mutation that raced a delete and
/// acquired the slot afterwards observes `deleted` and reports `NotFound`
/// instead of resurrecting the room.
struct RoomSlot {
    room: Room,
    deleted: bool,
}

/// In-memory store: an outer map from code to a per-room async mutex.
/// Lookups share the map read lock; insert and delete serialize on the map
/// write lock, which doubles as the global serialization point for the
/// code-uniqueness and room-cap invariants.
#[derive(Default)]
pub struct MemoryRoomStore {
    rooms: RwLock<HashMap<String, Arc<Mutex<RoomSlot>>>>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, code: &str) -> Option<Arc<Mutex<RoomSlot>>> {
        self.rooms.read().await.get(code).cloned()
    }

    /// Test-only: rewind a room's activity clock.
    #[cfg(test)]
    pub(crate) async fn age_room(&self, code: &str, by: std::time::Duration) {
        if let Some(slot) = self.slot(code).await {
            let mut guard = slot.lock().await;
            guard.room.last_active -= by;
        }
    }
}

impl RoomStore for MemoryRoomStore {
    async fn create(&self, room: Room, max_rooms: usize) -> Result<(), StoreError> {
        let mut map = self.rooms.write().await;
        if map.len() >= max_rooms {
            return Err(StoreError::AtCapacity);
        }
        if map.contains_key(&room.code) {
            return Err(StoreError::DuplicateCode);
        }
        map.insert(
            room.code.clone(),
            Arc::new(Mutex::new(RoomSlot {
                room,
                deleted: false,
            })),
        );
        Ok(())
    }

    async fn get(&self, code: &str) -> Option<Room> {
        let slot = self.slot(code).await?;
        let guard = slot.lock().await;
        if guard.deleted {
            None
        } else {
            Some(guard.room.clone())
        }
    }

    async fn mutate<T, F>(&self, code: &str, f: F) -> Result<T, StoreError>
    where
        T: Send,
        F: FnOnce(&mut Room) -> (T, Commit) + Send,
    {
        let slot = self.slot(code).await.ok_or(StoreError::NotFound)?;
        let mut guard = slot.lock().await;
        if guard.deleted {
            return Err(StoreError::NotFound);
        }
        let (value, verdict) = f(&mut guard.room);
        if verdict == Commit::Remove {
            // Tombstone first, while still holding the slot: from this
            // point no other mutation can observe the room as live.
            guard.deleted = true;
            let code = guard.room.code.clone();
            drop(guard);
            self.rooms.write().await.remove(&code);
        }
        Ok(value)
    }

    async fn remove(&self, code: &str) -> bool {
        let slot = { self.rooms.write().await.remove(code) };
        match slot {
            Some(slot) => {
                slot.lock().await.deleted = true;
                true
            },
            None => false,
        }
    }

    async fn list_all(&self) -> Vec<Room> {
        let slots: Vec<Arc<Mutex<RoomSlot>>> =
            self.rooms.read().await.values().cloned().collect();
        let mut rooms = Vec::with_capacity(slots.len());
        for slot in slots {
            let guard = slot.lock().await;
            if !guard.deleted {
                rooms.push(guard.room.clone());
            }
        }
        rooms
    }

    async fn count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
