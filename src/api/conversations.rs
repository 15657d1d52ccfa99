use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::services::{directory, message_log};
use crate::utils::error::AppResult;
use crate::utils::helpers::{extract_participant, json_list, json_response};

#[derive(Deserialize)]
struct ResolveConversationRequest {
    peer_id: String,
}

#[derive(Deserialize)]
struct SendMessageRequest {
    content: String,
}

async fn resolve_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ResolveConversationRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let participant_id = extract_participant(&headers)?;
    let conversation =
        directory::resolve_or_create(&state.db, &participant_id, &req.peer_id).await?;
    Ok(json_response(&conversation))
}

async fn list_conversations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let participant_id = extract_participant(&headers)?;
    let conversations = directory::get_user_conversations(&state.db, &participant_id).await?;
    Ok(json_list(conversations))
}

async fn get_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(peer_id): Path<String>,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let participant_id = extract_participant(&headers)?;
    let conversation = directory::resolve_or_create(&state.db, &participant_id, &peer_id).await?;
    let messages = message_log::list_all(&state.db, &conversation.id).await?;
    Ok(json_list(messages))
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(peer_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let participant_id = extract_participant(&headers)?;
    let message = state
        .service
        .send_message(&participant_id, &peer_id, &req.content)
        .await?;
    Ok(json_response(&message))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(peer_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let participant_id = extract_participant(&headers)?;
    let updated = state.service.mark_read(&participant_id, &peer_id).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(resolve_conversation))
        .route("/", get(list_conversations))
        .route("/:peer_id/messages", get(get_messages))
        .route("/:peer_id/messages", post(send_message))
        .route("/:peer_id/read", post(mark_read))
        .with_state(state)
}
