use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use faceoff_core::room::{Room, RoomStatus, Side, TopicId, UserId};

use crate::index::SeatIndex;

/// Storage key for a room record.
pub fn room_key(id: Uuid) -> String {
    format!("room:{id}")
}

/// Storage key for a user's membership set.
pub fn user_rooms_key(user: UserId) -> String {
    format!("user_rooms:{user}")
}

/// The store backend could not be reached or timed out. Never conflated
/// with "no such room" or "seat taken": absence of a key is a normal
/// result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(m) => write!(f, "store unavailable: {m}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Result of an atomic seat claim.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// The seat was filled; `room` is the post-claim snapshot.
    Claimed { room: Room, side: Side },
    /// The room vanished, filled up, or the open side does not satisfy
    /// the caller's preference. Nothing was mutated.
    Unavailable,
}

/// Result of an atomic seat release.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    /// The other seat is still occupied; the room reverted to waiting.
    Reverted(Room),
    /// Both seats became empty and the record was deleted.
    Deleted,
    /// The user held no seat in this room (or the room is gone).
    /// Releasing is idempotent, so this is not an error.
    NotOccupied,
}

/// Live room counts, for health reporting.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct StoreStats {
    pub live: usize,
    pub waiting: usize,
    pub matched: usize,
}

/// Shared room storage plus the per-user membership index.
///
/// The store does not enforce the seat/status invariant; the coordinator
/// does. What the store must guarantee is that `claim_seat` and
/// `release_seat` each execute as one atomic step with respect to
/// concurrent callers, so two racing claims can never both fill the same
/// seat. External implementations must bound every call with a timeout
/// and surface a timeout as `StoreError::Unavailable`.
pub trait RoomStore: Send + Sync {
    /// Create or replace a room record and index its open seat.
    fn insert_room(&self, room: Room) -> Result<(), StoreError>;

    /// Snapshot read of a room. `None` when the key is absent.
    fn room(&self, id: Uuid) -> Result<Option<Room>, StoreError>;

    /// Atomically claim the open seat of a waiting room, re-validating
    /// every precondition under the store's critical section.
    fn claim_seat(
        &self,
        room_id: Uuid,
        user: UserId,
        preferred: Option<Side>,
    ) -> Result<ClaimOutcome, StoreError>;

    /// Atomically clear whichever seat holds `user`, deleting the room if
    /// it becomes empty and reverting it to waiting otherwise.
    fn release_seat(&self, room_id: Uuid, user: UserId) -> Result<ReleaseOutcome, StoreError>;

    /// Locate a waiting room for `(topic_id, theme_name)` whose open side
    /// satisfies `preferred` when given. First-found selection.
    fn find_open_room(
        &self,
        topic_id: TopicId,
        theme_name: &str,
        preferred: Option<Side>,
    ) -> Result<Option<Room>, StoreError>;

    fn add_membership(&self, user: UserId, room_id: Uuid) -> Result<(), StoreError>;

    fn remove_membership(&self, user: UserId, room_id: Uuid) -> Result<(), StoreError>;

    /// Room ids the user currently occupies. Empty when the key is absent.
    fn memberships(&self, user: UserId) -> Result<Vec<Uuid>, StoreError>;

    fn live_room_ids(&self) -> Result<Vec<Uuid>, StoreError>;

    fn stats(&self) -> Result<StoreStats, StoreError>;
}

#[derive(Default)]
struct Inner {
    /// Room records keyed by `room:{id}`.
    rooms: HashMap<String, Room>,
    /// Membership sets keyed by `user_rooms:{user_id}`.
    memberships: HashMap<String, BTreeSet<Uuid>>,
    index: SeatIndex,
}

/// In-process `RoomStore`. One mutex guards rooms, memberships, and the
/// seat index together, which is what makes every trait operation a
/// single atomic step.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl RoomStore for MemoryStore {
    fn insert_room(&self, room: Room) -> Result<(), StoreError> {
        debug_assert!(!room.is_empty(), "empty rooms must not be persisted");
        let mut inner = self.lock()?;
        inner.index.remove(&room);
        inner.index.insert(&room);
        inner.rooms.insert(room_key(room.id), room);
        Ok(())
    }

    fn room(&self, id: Uuid) -> Result<Option<Room>, StoreError> {
        Ok(self.lock()?.rooms.get(&room_key(id)).cloned())
    }

    fn claim_seat(
        &self,
        room_id: Uuid,
        user: UserId,
        preferred: Option<Side>,
    ) -> Result<ClaimOutcome, StoreError> {
        let mut inner = self.lock()?;
        let key = room_key(room_id);
        let Some(existing) = inner.rooms.get(&key) else {
            return Ok(ClaimOutcome::Unavailable);
        };
        if existing.status != RoomStatus::Waiting {
            return Ok(ClaimOutcome::Unavailable);
        }
        let Some(open) = existing.open_side() else {
            return Ok(ClaimOutcome::Unavailable);
        };
        if let Some(want) = preferred
            && want != open
        {
            return Ok(ClaimOutcome::Unavailable);
        }
        // A user never occupies both seats of one room.
        if existing.has_user(user) {
            return Ok(ClaimOutcome::Unavailable);
        }

        let mut room = existing.clone();
        *room.seat_mut(open) = Some(user);
        room.status = RoomStatus::Matched;
        room.touch();
        inner.index.remove(&room);
        inner.rooms.insert(key, room.clone());
        Ok(ClaimOutcome::Claimed { room, side: open })
    }

    fn release_seat(&self, room_id: Uuid, user: UserId) -> Result<ReleaseOutcome, StoreError> {
        let mut inner = self.lock()?;
        let key = room_key(room_id);
        let Some(existing) = inner.rooms.get(&key) else {
            return Ok(ReleaseOutcome::NotOccupied);
        };
        let Some(side) = existing.side_of(user) else {
            return Ok(ReleaseOutcome::NotOccupied);
        };

        let mut room = existing.clone();
        *room.seat_mut(side) = None;
        if room.is_empty() {
            inner.index.remove(&room);
            inner.rooms.remove(&key);
            return Ok(ReleaseOutcome::Deleted);
        }
        // A matched room that loses a participant reopens, never completes.
        room.status = RoomStatus::Waiting;
        room.touch();
        inner.index.remove(&room);
        inner.index.insert(&room);
        inner.rooms.insert(key, room.clone());
        Ok(ReleaseOutcome::Reverted(room))
    }

    fn find_open_room(
        &self,
        topic_id: TopicId,
        theme_name: &str,
        preferred: Option<Side>,
    ) -> Result<Option<Room>, StoreError> {
        let inner = self.lock()?;
        let Some(id) = inner.index.find(topic_id, theme_name, preferred) else {
            return Ok(None);
        };
        Ok(inner.rooms.get(&room_key(id)).cloned())
    }

    fn add_membership(&self, user: UserId, room_id: Uuid) -> Result<(), StoreError> {
        self.lock()?
            .memberships
            .entry(user_rooms_key(user))
            .or_default()
            .insert(room_id);
        Ok(())
    }

    fn remove_membership(&self, user: UserId, room_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let key = user_rooms_key(user);
        if let Some(set) = inner.memberships.get_mut(&key) {
            set.remove(&room_id);
            if set.is_empty() {
                inner.memberships.remove(&key);
            }
        }
        Ok(())
    }

    fn memberships(&self, user: UserId) -> Result<Vec<Uuid>, StoreError> {
        Ok(self
            .lock()?
            .memberships
            .get(&user_rooms_key(user))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    fn live_room_ids(&self) -> Result<Vec<Uuid>, StoreError> {
        Ok(self.lock()?.rooms.values().map(|r| r.id).collect())
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let inner = self.lock()?;
        let mut stats = StoreStats {
            live: inner.rooms.len(),
            ..StoreStats::default()
        };
        for room in inner.rooms.values() {
            match room.status {
                RoomStatus::Waiting => stats.waiting += 1,
                RoomStatus::Matched => stats.matched += 1,
                RoomStatus::Completed => {},
            }
        }
        Ok(stats)
    }
}
