use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde_json::json;

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// GET /api/v1/ws
///
/// Upgrade to a WebSocket that receives a `connected` greeting, then every
/// `stock_update` and `new_purchase` frame. Clients are not expected to
/// send anything.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Registers the connection, forwards outbound frames from the manager
/// channel on a spawned task, and drains inbound frames until the client
/// goes away.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    if sink.send(connected_frame(&conn_id)).await.is_err() {
        ws_manager.remove(&conn_id).await;
        tracing::debug!(conn_id = %conn_id, "WebSocket closed before greeting");
        return;
    }

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// First frame sent on every connection.
fn connected_frame(conn_id: &str) -> Message {
    let body = json!({
        "type": "connected",
        "conn_id": conn_id,
        "message": "Connected to inventory system",
    });
    Message::Text(body.to_string().into())
}
