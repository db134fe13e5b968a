use axum::extract::{FromRequestParts, Path, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use faceoff_core::room::{Room, Side, TopicId, UserId};

use crate::coordinator::{JoinOutcome, LeaveOutcome};
use crate::error::AppError;
use crate::state::AppState;

/// Identity resolved by the layer in front of this service and forwarded
/// in the `x-user-id` header. This service never authenticates.
pub struct AuthedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<UserId>().ok())
            .map(AuthedUser)
            .ok_or_else(|| AppError::unauthorized("missing or malformed x-user-id header"))
    }
}

/// Request body for joining a room.
#[derive(Debug, Deserialize)]
pub struct JoinRoomBody {
    pub topic_id: TopicId,
    pub theme_name: String,
    #[serde(default)]
    pub preferred_side: Option<String>,
}

/// Shape validation lives here, not in the coordinator.
fn validate_join_body(body: &JoinRoomBody, max_theme_len: usize) -> Result<Option<Side>, AppError> {
    if body.topic_id == 0 {
        return Err(AppError::bad_request("invalid_topic", "topic_id must be >= 1"));
    }
    if body.theme_name.is_empty() {
        return Err(AppError::bad_request("invalid_theme", "theme_name must not be empty"));
    }
    if body.theme_name.len() > max_theme_len {
        return Err(AppError::bad_request(
            "invalid_theme",
            format!("theme_name exceeds {max_theme_len} chars"),
        ));
    }
    match body.preferred_side.as_deref() {
        None => Ok(None),
        Some(raw) => raw.parse::<Side>().map(Some).map_err(|()| {
            AppError::bad_request(
                "invalid_side",
                "preferred_side must be \"positive\" or \"negative\"",
            )
        }),
    }
}

/// POST /api/v1/rooms/join
pub async fn join_room(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Json(body): Json<JoinRoomBody>,
) -> Result<(StatusCode, Json<JoinOutcome>), AppError> {
    let preferred = validate_join_body(&body, state.config.limits.max_theme_len)?;
    let outcome = state
        .coordinator
        .join(user, body.topic_id, &body.theme_name, preferred)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/v1/rooms/leave
pub async fn leave_room(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
) -> Result<Json<LeaveOutcome>, AppError> {
    let outcome = state.coordinator.leave(user)?;
    Ok(Json(outcome))
}

/// GET /api/v1/rooms/{room_id} — snapshot read.
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Room>, AppError> {
    match state.store.room(room_id) {
        Ok(Some(room)) => Ok(Json(room)),
        Ok(None) => Err(AppError::not_found("room_not_found", "no such room")),
        Err(e) => Err(AppError::unavailable("store_unavailable", e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(topic_id: TopicId, theme: &str, side: Option<&str>) -> JoinRoomBody {
        JoinRoomBody {
            topic_id,
            theme_name: theme.to_string(),
            preferred_side: side.map(str::to_string),
        }
    }

    #[test]
    fn valid_bodies_pass() {
        assert_eq!(validate_join_body(&body(1, "privacy", None), 255).unwrap(), None);
        assert_eq!(
            validate_join_body(&body(1, "privacy", Some("negative")), 255).unwrap(),
            Some(Side::Negative)
        );
    }

    #[test]
    fn zero_topic_rejected() {
        let err = validate_join_body(&body(0, "privacy", None), 255).unwrap_err();
        assert_eq!(err.code, "invalid_topic");
    }

    #[test]
    fn empty_and_oversized_themes_rejected() {
        assert_eq!(
            validate_join_body(&body(1, "", None), 255).unwrap_err().code,
            "invalid_theme"
        );
        let long = "x".repeat(256);
        assert_eq!(
            validate_join_body(&body(1, &long, None), 255).unwrap_err().code,
            "invalid_theme"
        );
    }

    #[test]
    fn unknown_side_token_rejected() {
        let err = validate_join_body(&body(1, "privacy", Some("both")), 255).unwrap_err();
        assert_eq!(err.code, "invalid_side");
    }
}
