pub mod events;
pub mod room;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use uuid::Uuid;

    use crate::room::{Room, RoomStatus, Side, UserId};

    /// Create a waiting room with one occupant on the given side.
    pub fn make_waiting_room(topic_id: u64, theme_name: &str, user: UserId, side: Side) -> Room {
        Room::new(topic_id, theme_name.to_string(), user, side)
    }

    /// Create a fully matched room with both seats occupied.
    pub fn make_matched_room(topic_id: u64, theme_name: &str, positive: UserId, negative: UserId) -> Room {
        let mut room = Room::new(topic_id, theme_name.to_string(), positive, Side::Positive);
        room.negative_user = Some(negative);
        room.status = RoomStatus::Matched;
        room
    }

    /// A fixed room id for tests that need a stable identifier.
    pub fn fixed_room_id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }
}
