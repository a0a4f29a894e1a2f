//! Shared JSON error envelope for every router.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Machine-readable error kinds carried next to the human readable message.
pub mod kind {
    pub const UNAUTHENTICATED: &str = "unauthenticated";
    pub const FORBIDDEN: &str = "forbidden";
    pub const INSUFFICIENT_CREDITS: &str = "insufficient_credits";
    pub const NOT_FOUND: &str = "not_found";
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const CONFLICT: &str = "conflict";
    pub const INTERNAL: &str = "internal";
}

pub fn error_response(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Response {
    let payload = json!({
        "error": message.into(),
        "kind": kind,
    });
    (status, Json(payload)).into_response()
}
