use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::sync::mpsc;

use crate::state::AppState;
use crate::ws::session::Session;

/// Run the actor-per-connection pattern for one chat WebSocket.
///
/// Splits the WebSocket into reader and writer halves:
/// - Writer task: owns the sink, forwards messages from an mpsc channel
/// - Reader loop: feeds text frames to the [`Session`] in arrival order
///
/// Broadcasts from other sessions reach this client by pushing onto the
/// channel, so a slow socket never holds up anyone else.
pub async fn run_connection(socket: WebSocket, state: AppState, remote_addr: SocketAddr) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    let mut session = Session::accept(state.registry.clone(), tx);
    let connection_id = session.id();
    session.open();

    tracing::debug!(
        connection_id = %connection_id,
        remote_addr = %remote_addr,
        "WebSocket actor started"
    );

    // Reader loop: process incoming WebSocket messages
    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    session.handle_text(text.as_str());
                }
                Message::Binary(data) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        bytes = data.len(),
                        "Ignoring binary frame"
                    );
                }
                // Pongs are sent by the transport itself
                Message::Ping(_) | Message::Pong(_) => {}
                Message::Close(frame) => {
                    tracing::info!(
                        connection_id = %connection_id,
                        reason = ?frame,
                        "Client initiated close"
                    );
                    break;
                }
            },
            Some(Err(e)) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "WebSocket receive error"
                );
                break;
            }
            None => {
                tracing::info!(connection_id = %connection_id, "WebSocket stream ended");
                break;
            }
        }
    }

    session.close();
    writer_handle.abort();

    tracing::debug!(
        connection_id = %connection_id,
        remote_addr = %remote_addr,
        "WebSocket actor stopped"
    );
}

/// Writer task: receives messages from mpsc channel and forwards them to the WebSocket sink.
async fn writer_task(
    mut ws_sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // WebSocket send failed, connection is broken
            break;
        }
    }
}
