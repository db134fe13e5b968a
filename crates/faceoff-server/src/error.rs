use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::coordinator::MatchError;

/// Outward-facing error: one stable machine code per failure kind, plus a
/// human message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "unauthorized",
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            code,
            message: message.into(),
        }
    }

    pub fn unavailable(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<MatchError> for AppError {
    fn from(e: MatchError) -> Self {
        let message = e.to_string();
        match e {
            MatchError::AlreadyJoined => Self::conflict("already_joined", message),
            MatchError::SeatUnavailable => Self::conflict("seat_unavailable", message),
            MatchError::NoActiveRoom => Self::bad_request("no_active_room", message),
            MatchError::RoomCapacity => Self::unavailable("room_capacity", message),
            MatchError::Store(_) => Self::unavailable("store_unavailable", message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message, "code": self.code })),
        )
            .into_response()
    }
}
