use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
};
use std::sync::Arc;

use crate::api::AppState;
use crate::services::identity;
use crate::utils::error::AppResult;
use crate::utils::helpers::{extract_participant, json_list, json_response};

async fn list_peers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let participant_id = extract_participant(&headers)?;
    let peers = identity::list_peers(&state.db, &participant_id).await?;
    Ok(json_list(peers))
}

async fn get_participant(
    State(state): State<Arc<AppState>>,
    Path(participant_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let participant = identity::lookup(&state.db, &participant_id).await?;
    Ok(json_response(&participant))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_peers))
        .route("/:participant_id", get(get_participant))
        .with_state(state)
}
