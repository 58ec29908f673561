//! Websocket update endpoint.
//!
//! Each connection is one viewer session: it gets the current snapshot right
//! away and every later snapshot as a JSON text frame.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use livemd_preview::DocumentSnapshot;

use crate::state::AppState;

/// Handle GET /update.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Serve one established connection until either side goes away.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    // Dropping the session at the end of this function unregisters it
    let mut session = state.hub.register();
    tracing::debug!(session = %session.id(), "Viewer connected");

    loop {
        tokio::select! {
            update = session.recv() => {
                let Some(snapshot) = update else {
                    tracing::debug!(session = %session.id(), "Session pruned, closing");
                    break;
                };
                let Some(payload) = encode(&snapshot) else {
                    continue;
                };
                if let Err(err) = socket.send(Message::Text(payload.into())).await {
                    tracing::debug!(session = %session.id(), error = %err, "Send failed");
                    break;
                }
            }
            // Client frames carry nothing; only closure matters
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!(session = %session.id(), "Viewer disconnected");
}

/// Serialize a snapshot as the `{"title", "html"}` payload.
fn encode(snapshot: &DocumentSnapshot) -> Option<String> {
    match serde_json::to_string(snapshot) {
        Ok(payload) => Some(payload),
        Err(err) => {
            tracing::warn!(error = %err, "Cannot encode snapshot");
            None
        }
    }
}
