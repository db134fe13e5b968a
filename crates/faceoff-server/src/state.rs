use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::ServerConfig;
use crate::coordinator::MatchCoordinator;
use crate::notifier::{BroadcastNotifier, NoopNotifier, Notifier};
use crate::store::{MemoryStore, RoomStore};

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<MatchCoordinator>,
    pub store: Arc<dyn RoomStore>,
    /// Present only when broadcasting is enabled; the SSE endpoint
    /// subscribes here.
    pub announcements: Option<BroadcastNotifier>,
    pub sse_subscriber_count: Arc<AtomicUsize>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let store: Arc<dyn RoomStore> = Arc::new(MemoryStore::new());
        let (announcements, notifier): (Option<BroadcastNotifier>, Arc<dyn Notifier>) =
            if config.broadcast.enabled {
                let broadcast = BroadcastNotifier::new(config.broadcast.capacity);
                (Some(broadcast.clone()), Arc::new(broadcast))
            } else {
                (None, Arc::new(NoopNotifier))
            };
        let coordinator = Arc::new(MatchCoordinator::new(
            Arc::clone(&store),
            notifier,
            config.limits.max_live_rooms,
        ));
        Self {
            coordinator,
            store,
            announcements,
            sse_subscriber_count: Arc::new(AtomicUsize::new(0)),
            config: Arc::new(config),
        }
    }
}

/// RAII counter for live SSE subscriptions; decrements when the stream is
/// dropped.
pub struct ConnectionGuard {
    counter: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    pub fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self { counter }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BroadcastConfig;

    #[test]
    fn broadcast_disabled_yields_no_subscription_handle() {
        let state = AppState::new(ServerConfig {
            broadcast: BroadcastConfig {
                enabled: false,
                ..BroadcastConfig::default()
            },
            ..ServerConfig::default()
        });
        assert!(state.announcements.is_none());
    }

    #[test]
    fn connection_guard_counts_up_and_down() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let _a = ConnectionGuard::new(Arc::clone(&counter));
            let _b = ConnectionGuard::new(Arc::clone(&counter));
            assert_eq!(counter.load(Ordering::Relaxed), 2);
        }
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }
}
