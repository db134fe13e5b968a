use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::room::{Room, Side, TopicId, UserId};

/// Event name published when a join completes a pairing.
pub const MATCHING_SUCCESS: &str = "matching-success";

/// Broadcast channel name for a room: `presence-room-{room_id}`.
pub fn room_channel(room_id: Uuid) -> String {
    format!("presence-room-{room_id}")
}

/// Minimal identity info carried in an announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub name: String,
}

impl UserInfo {
    /// Display names are not this service's concern; synthesize one from
    /// the id the way the outward API always has.
    pub fn from_id(id: UserId) -> Self {
        Self {
            id,
            name: format!("User {id}"),
        }
    }
}

/// Payload announced to both participants when a room becomes matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAnnouncement {
    pub room_id: Uuid,
    pub topic_id: TopicId,
    pub theme_name: String,
    pub positive_user: Option<UserInfo>,
    pub negative_user: Option<UserInfo>,
}

impl MatchAnnouncement {
    /// Build the announcement from a final room snapshot.
    pub fn from_room(room: &Room) -> Self {
        Self {
            room_id: room.id,
            topic_id: room.topic_id,
            theme_name: room.theme_name.clone(),
            positive_user: room.occupant(Side::Positive).map(UserInfo::from_id),
            negative_user: room.occupant(Side::Negative).map(UserInfo::from_id),
        }
    }

    pub fn channel(&self) -> String {
        room_channel(self.room_id)
    }
}
