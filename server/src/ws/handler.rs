use axum::{
    extract::{ConnectInfo, State, WebSocketUpgrade},
    response::Response,
};
use std::net::SocketAddr;

use crate::state::AppState;
use crate::ws::actor;

/// GET /websocket
/// Upgrades to a chat WebSocket. There is no authentication: anyone who can
/// reach the endpoint joins the room as "Anonymous".
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    tracing::debug!(remote_addr = %remote_addr, "WebSocket upgrade requested");
    ws.on_upgrade(move |socket| actor::run_connection(socket, state, remote_addr))
}
