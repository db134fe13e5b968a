use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use faceoff_core::room::{Room, RoomStatus, Side, TopicId};

/// Open-seat ids for one `(topic_id, theme_name)` bucket.
#[derive(Debug, Default)]
struct OpenSeats {
    positive: BTreeSet<Uuid>,
    negative: BTreeSet<Uuid>,
}

impl OpenSeats {
    fn side(&self, side: Side) -> &BTreeSet<Uuid> {
        match side {
            Side::Positive => &self.positive,
            Side::Negative => &self.negative,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeSet<Uuid> {
        match side {
            Side::Positive => &mut self.positive,
            Side::Negative => &mut self.negative,
        }
    }

    fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}

/// Secondary index over waiting rooms, keyed by `(topic_id, theme_name)`
/// with one bucket per open side.
///
/// Replaces a full scan of live rooms: lookup cost is one or two map
/// probes regardless of room count. Must be updated inside the same
/// critical section as the room mutation it reflects, otherwise a racing
/// finder can observe a seat that is no longer open.
#[derive(Debug, Default)]
pub struct SeatIndex {
    buckets: HashMap<TopicId, HashMap<String, OpenSeats>>,
}

impl SeatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `room`'s open side. Rooms that are full or not waiting are
    /// not indexed.
    pub fn insert(&mut self, room: &Room) {
        if room.status != RoomStatus::Waiting {
            return;
        }
        let Some(side) = room.open_side() else {
            return;
        };
        self.buckets
            .entry(room.topic_id)
            .or_default()
            .entry(room.theme_name.clone())
            .or_default()
            .side_mut(side)
            .insert(room.id);
    }

    /// Drop any entry for `room` on either side, pruning empty buckets.
    pub fn remove(&mut self, room: &Room) {
        let Some(themes) = self.buckets.get_mut(&room.topic_id) else {
            return;
        };
        if let Some(seats) = themes.get_mut(&room.theme_name) {
            seats.positive.remove(&room.id);
            seats.negative.remove(&room.id);
            if seats.is_empty() {
                themes.remove(&room.theme_name);
            }
        }
        if themes.is_empty() {
            self.buckets.remove(&room.topic_id);
        }
    }

    /// First room id with a matching open seat. Selection among several
    /// candidates is unspecified; callers must not rely on order.
    pub fn find(
        &self,
        topic_id: TopicId,
        theme_name: &str,
        preferred: Option<Side>,
    ) -> Option<Uuid> {
        let seats = self.buckets.get(&topic_id)?.get(theme_name)?;
        match preferred {
            Some(side) => seats.side(side).iter().next().copied(),
            None => seats
                .positive
                .iter()
                .next()
                .or_else(|| seats.negative.iter().next())
                .copied(),
        }
    }

    /// Total indexed open seats, for diagnostics.
    pub fn open_seat_count(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|themes| themes.values())
            .map(|s| s.positive.len() + s.negative.len())
            .sum()
    }
}
