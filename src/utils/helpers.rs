use axum::{Json, http::HeaderMap};
use serde::Serialize;

use crate::utils::error::{AppError, AppResult};

/// Header carrying the already-authenticated caller identity. The core
/// trusts it; authentication happens upstream.
pub const PARTICIPANT_ID_HEADER: &str = "x-participant-id";

pub fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).expect("Failed to serialize to JSON")
}

pub fn json_response<T: Serialize>(value: &T) -> Json<serde_json::Value> {
    Json(to_json(value))
}

pub fn json_list<T: Serialize>(items: Vec<T>) -> Json<Vec<serde_json::Value>> {
    Json(items.into_iter().map(|item| to_json(&item)).collect())
}

pub fn extract_participant(headers: &HeaderMap) -> AppResult<String> {
    headers
        .get(PARTICIPANT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::Unauthorized(format!("missing {PARTICIPANT_ID_HEADER} header")))
}
