use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use faceoff_core::events::{MATCHING_SUCCESS, MatchAnnouncement, room_channel};
use faceoff_core::room::{Room, Side, TopicId, UserId};

use crate::notifier::Notifier;
use crate::store::{ClaimOutcome, ReleaseOutcome, RoomStore, StoreError};

/// Typed failures of `join` and `leave`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The user already occupies a room (at-most-one-room rule).
    AlreadyJoined,
    /// The candidate's seat was taken between search and claim, or the
    /// only open side does not match the requested one. Retrying is the
    /// caller's decision.
    SeatUnavailable,
    /// `leave` with an empty membership set.
    NoActiveRoom,
    /// The live-room cap was reached and no new room may be created.
    RoomCapacity,
    Store(StoreError),
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyJoined => write!(f, "already joined a room"),
            Self::SeatUnavailable => write!(f, "requested seat is not available"),
            Self::NoActiveRoom => write!(f, "no active room to leave"),
            Self::RoomCapacity => write!(f, "room capacity reached"),
            Self::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MatchError {}

impl From<StoreError> for MatchError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Result of a successful `join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinOutcome {
    pub room_id: Uuid,
    pub side: Side,
    pub matched: bool,
    /// Broadcast channel the caller should subscribe to.
    pub channel: String,
}

/// Result of a successful `leave`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaveOutcome {
    pub rooms_left: Vec<Uuid>,
}

/// The state machine that owns every matching invariant: find-or-create
/// on join, atomic seat claim, membership bookkeeping, and reversal on
/// leave. Holds no lock of its own; atomicity lives in the store's
/// claim/release operations, so any number of tasks may call in
/// concurrently.
pub struct MatchCoordinator {
    store: Arc<dyn RoomStore>,
    notifier: Arc<dyn Notifier>,
    max_live_rooms: usize,
}

impl MatchCoordinator {
    pub fn new(store: Arc<dyn RoomStore>, notifier: Arc<dyn Notifier>, max_live_rooms: usize) -> Self {
        Self {
            store,
            notifier,
            max_live_rooms,
        }
    }

    /// Seat `user` in a room for `(topic_id, theme_name)`, pairing with a
    /// waiting opponent when one exists and opening a new room otherwise.
    pub fn join(
        &self,
        user: UserId,
        topic_id: TopicId,
        theme_name: &str,
        preferred: Option<Side>,
    ) -> Result<JoinOutcome, MatchError> {
        // At-most-one-room rule. A store failure here surfaces as
        // StoreUnavailable rather than "not a member": treating an
        // unreachable store as an empty membership set would admit
        // double-joins during an outage.
        if !self.store.memberships(user)?.is_empty() {
            return Err(MatchError::AlreadyJoined);
        }

        match self.store.find_open_room(topic_id, theme_name, preferred)? {
            Some(candidate) => self.join_existing(candidate, user, preferred),
            None => self.create_room(user, topic_id, theme_name, preferred),
        }
    }

    fn join_existing(
        &self,
        candidate: Room,
        user: UserId,
        preferred: Option<Side>,
    ) -> Result<JoinOutcome, MatchError> {
        // The claim re-validates everything the finder saw; a racing
        // winner leaves us with Unavailable, never a double-filled seat.
        match self.store.claim_seat(candidate.id, user, preferred)? {
            ClaimOutcome::Unavailable => Err(MatchError::SeatUnavailable),
            ClaimOutcome::Claimed { room, side } => {
                self.store.add_membership(user, room.id)?;
                tracing::info!(
                    user_id = user,
                    room_id = %room.id,
                    side = %side,
                    "user joined existing room, pairing complete"
                );
                self.announce(&room);
                Ok(JoinOutcome {
                    room_id: room.id,
                    side,
                    matched: true,
                    channel: room_channel(room.id),
                })
            },
        }
    }

    fn create_room(
        &self,
        user: UserId,
        topic_id: TopicId,
        theme_name: &str,
        preferred: Option<Side>,
    ) -> Result<JoinOutcome, MatchError> {
        if self.store.stats()?.live >= self.max_live_rooms {
            tracing::warn!(max = self.max_live_rooms, "live room cap reached");
            return Err(MatchError::RoomCapacity);
        }

        let side = preferred.unwrap_or(Side::Positive);
        let room = Room::new(topic_id, theme_name.to_string(), user, side);
        self.store.insert_room(room.clone())?;
        self.store.add_membership(user, room.id)?;
        tracing::info!(
            user_id = user,
            room_id = %room.id,
            side = %side,
            topic_id,
            theme_name,
            "created new room, waiting for opponent"
        );
        Ok(JoinOutcome {
            room_id: room.id,
            side,
            matched: false,
            channel: room_channel(room.id),
        })
    }

    /// Remove `user` from every room they occupy. Each room's cleanup is
    /// individually atomic and idempotent, so a retried leave after a
    /// mid-loop store failure is safe.
    pub fn leave(&self, user: UserId) -> Result<LeaveOutcome, MatchError> {
        let rooms = self.store.memberships(user)?;
        if rooms.is_empty() {
            return Err(MatchError::NoActiveRoom);
        }

        let mut rooms_left = Vec::with_capacity(rooms.len());
        for room_id in rooms {
            match self.store.release_seat(room_id, user)? {
                ReleaseOutcome::Deleted => {
                    tracing::info!(user_id = user, room_id = %room_id, "room emptied and deleted");
                },
                ReleaseOutcome::Reverted(_) => {
                    tracing::info!(user_id = user, room_id = %room_id, "room reverted to waiting");
                },
                ReleaseOutcome::NotOccupied => {
                    // Stale membership entry from an earlier partial
                    // failure; removing it below repairs the index.
                    tracing::debug!(user_id = user, room_id = %room_id, "no seat held in room");
                },
            }
            self.store.remove_membership(user, room_id)?;
            rooms_left.push(room_id);
        }
        Ok(LeaveOutcome { rooms_left })
    }

    /// Best-effort: failure is logged and swallowed, never undoing the
    /// match or failing the join that triggered it.
    fn announce(&self, room: &Room) {
        let announcement = MatchAnnouncement::from_room(room);
        if let Err(e) = self
            .notifier
            .publish(&announcement.channel(), MATCHING_SUCCESS, &announcement)
        {
            tracing::warn!(room_id = %room.id, error = %e, "match announcement failed; match stands");
        }
    }
}
