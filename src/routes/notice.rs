//! User-facing notices.
//!
//! Every API failure (and the few successes the storefront announces) comes
//! back as `{"level": ..., "message": ...}` so the frontend can show it as a
//! transient toast. Internal error detail is logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    #[serde(skip)]
    pub status: StatusCode,
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, level: NoticeLevel::Error, message: message.into() }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { status: StatusCode::OK, level: NoticeLevel::Success, message: message.into() }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self { status: StatusCode::OK, level: NoticeLevel::Info, message: message.into() }
    }

    /// 500 with a generic message; `err` goes to the log only.
    pub fn internal(err: &dyn std::fmt::Display, message: &str) -> Self {
        tracing::error!(error = %err, "{message}");
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for Notice {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, Notice>;
