use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::page::chat;
use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// Build the full axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Chat page and its assets (stateless, never touch the registry)
    let page_routes = Router::new()
        .route("/", get(chat::chat_page))
        .nest_service("/static", ServeDir::new(&state.static_dir));

    // WebSocket endpoint the page's script connects to
    let ws_routes = Router::new().route("/websocket", get(ws_handler::ws_upgrade));

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(page_routes)
        .merge(ws_routes)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
