use tokio::sync::broadcast;

use faceoff_core::events::MatchAnnouncement;

/// Default broadcast channel capacity for announcement fan-out.
const DEFAULT_BROADCAST_CAPACITY: usize = 1024;

/// Delivery to the broadcast transport failed. The coordinator logs and
/// swallows this; a lost announcement never rolls back a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError(pub String);

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "notify failed: {}", self.0)
    }
}

impl std::error::Error for NotifyError {}

/// Best-effort broadcast transport for pairing announcements.
///
/// `channel` is `presence-room-{room_id}` and `event` is
/// `matching-success`; implementations that multiplex everything onto one
/// pipe may use them only for labeling.
pub trait Notifier: Send + Sync {
    fn publish(
        &self,
        channel: &str,
        event: &str,
        payload: &MatchAnnouncement,
    ) -> Result<(), NotifyError>;
}

/// In-process fan-out over a tokio broadcast channel. Subscribers filter
/// by room id; having no subscribers at publish time is success, not an
/// error.
#[derive(Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<MatchAnnouncement>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MatchAnnouncement> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

impl Notifier for BroadcastNotifier {
    fn publish(
        &self,
        channel: &str,
        event: &str,
        payload: &MatchAnnouncement,
    ) -> Result<(), NotifyError> {
        // send() errors only when there are no receivers; nobody listening
        // is a fine outcome for a best-effort announcement.
        match self.tx.send(payload.clone()) {
            Ok(receivers) => {
                tracing::debug!(channel, event, receivers, "announcement published");
            },
            Err(_) => {
                tracing::debug!(channel, event, "announcement published to zero subscribers");
            },
        }
        Ok(())
    }
}

/// Used when broadcasting is disabled in config. A valid configuration,
/// not a degraded one.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn publish(
        &self,
        channel: &str,
        event: &str,
        _payload: &MatchAnnouncement,
    ) -> Result<(), NotifyError> {
        tracing::debug!(channel, event, "broadcast disabled, dropping announcement");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faceoff_core::events::MATCHING_SUCCESS;
    use faceoff_core::test_helpers::make_matched_room;

    #[test]
    fn publish_reaches_subscriber() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();
        let ann = MatchAnnouncement::from_room(&make_matched_room(1, "privacy", 1, 2));

        notifier
            .publish(&ann.channel(), MATCHING_SUCCESS, &ann)
            .unwrap();
        let received = rx.try_recv().unwrap();
        assert_eq!(received, ann);
    }

    #[test]
    fn publish_without_subscribers_is_ok() {
        let notifier = BroadcastNotifier::new(8);
        let ann = MatchAnnouncement::from_room(&make_matched_room(1, "privacy", 1, 2));
        assert!(notifier
            .publish(&ann.channel(), MATCHING_SUCCESS, &ann)
            .is_ok());
    }
}
