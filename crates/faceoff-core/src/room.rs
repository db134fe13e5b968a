use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::epoch_secs;

/// Identifier of an authenticated user, resolved upstream of this service.
pub type UserId = u64;

/// Integer category key for a debate topic.
pub type TopicId = u64;

/// One of the two seats of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Positive,
    Negative,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Positive => "positive",
            Side::Negative => "negative",
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Positive => Side::Negative,
            Side::Negative => Side::Positive,
        }
    }
}

impl std::str::FromStr for Side {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Side::Positive),
            "negative" => Ok(Side::Negative),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a room.
///
/// `Completed` is reserved for a future explicit room-closing operation;
/// the coordinator never produces it, but it stays decodable so stored
/// records from a newer writer round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Matched,
    Completed,
}

/// A two-seat matching unit scoped to one `(topic_id, theme_name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub topic_id: TopicId,
    pub theme_name: String,
    pub positive_user: Option<UserId>,
    pub negative_user: Option<UserId>,
    pub status: RoomStatus,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Room {
    /// Create a waiting room with `user` seated on `side` and the other
    /// seat open.
    pub fn new(topic_id: TopicId, theme_name: String, user: UserId, side: Side) -> Self {
        let now = epoch_secs();
        let mut room = Self {
            id: Uuid::new_v4(),
            topic_id,
            theme_name,
            positive_user: None,
            negative_user: None,
            status: RoomStatus::Waiting,
            created_at: now,
            updated_at: now,
        };
        *room.seat_mut(side) = Some(user);
        room
    }

    /// Both seats occupied.
    pub fn is_full(&self) -> bool {
        self.positive_user.is_some() && self.negative_user.is_some()
    }

    /// Neither seat occupied. Such a room must never be persisted.
    pub fn is_empty(&self) -> bool {
        self.positive_user.is_none() && self.negative_user.is_none()
    }

    pub fn has_user(&self, user: UserId) -> bool {
        self.positive_user == Some(user) || self.negative_user == Some(user)
    }

    /// The single open side of a waiting room, if any. A full room has none.
    pub fn open_side(&self) -> Option<Side> {
        if self.positive_user.is_none() {
            Some(Side::Positive)
        } else if self.negative_user.is_none() {
            Some(Side::Negative)
        } else {
            None
        }
    }

    /// The side `user` occupies, if seated.
    pub fn side_of(&self, user: UserId) -> Option<Side> {
        if self.positive_user == Some(user) {
            Some(Side::Positive)
        } else if self.negative_user == Some(user) {
            Some(Side::Negative)
        } else {
            None
        }
    }

    pub fn occupant(&self, side: Side) -> Option<UserId> {
        match side {
            Side::Positive => self.positive_user,
            Side::Negative => self.negative_user,
        }
    }

    pub fn seat_mut(&mut self, side: Side) -> &mut Option<UserId> {
        match side {
            Side::Positive => &mut self.positive_user,
            Side::Negative => &mut self.negative_user,
        }
    }

    /// Refresh `updated_at`. Call on every mutation.
    pub fn touch(&mut self) {
        self.updated_at = epoch_secs();
    }
}
