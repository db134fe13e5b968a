use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::{Path, State};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use faceoff_core::events::MATCHING_SUCCESS;

use crate::error::AppError;
use crate::state::{AppState, ConnectionGuard};

/// GET /api/v1/rooms/{room_id}/stream — SSE feed of `matching-success`
/// announcements for one room's channel.
pub async fn match_stream(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, AppError> {
    let Some(notifier) = state.announcements.clone() else {
        return Err(AppError::unavailable(
            "broadcast_disabled",
            "announcement broadcasting is disabled",
        ));
    };

    let max_sse = state.config.limits.max_sse_subscribers;
    let current = state.sse_subscriber_count.load(Ordering::Relaxed);
    if current >= max_sse {
        tracing::warn!(current, max = max_sse, "SSE subscriber limit reached");
        return Err(AppError::unavailable(
            "subscriber_limit",
            "too many concurrent stream subscribers",
        ));
    }

    let guard = ConnectionGuard::new(Arc::clone(&state.sse_subscriber_count));
    let rx = notifier.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let _guard = &guard;
        match result {
            Ok(announcement) if announcement.room_id == room_id => {
                let json = serde_json::to_string(&announcement).unwrap_or_default();
                Some(Ok(SseEvent::default()
                    .event(MATCHING_SUCCESS)
                    .data(json)
                    .id(announcement.room_id.to_string())))
            },
            // Announcements for other rooms are not this subscriber's.
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("SSE broadcast receive error: {e}");
                None
            },
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
