pub mod conversations;
pub mod participants;

use axum::Router;
use std::sync::Arc;

use crate::database::DbPool;
use crate::services::conversation::ConversationService;

pub struct AppState {
    pub db: DbPool,
    pub service: ConversationService,
}

async fn health_check() -> &'static str {
    "OK"
}

pub fn routes(state: Arc<AppState>) -> Router {
    let ws_route = Router::new()
        .route(
            "/ws",
            axum::routing::get(crate::websocket::handlers::ws_handler),
        )
        .with_state(state.clone());

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(ws_route)
        .nest("/participants", participants::routes(state.clone()))
        .nest("/conversations", conversations::routes(state))
}
