//! WebSocket endpoint for viewer sessions.
//!
//! A client connecting to `GET /ws` is attached to the broadcaster, gets
//! the current snapshot straight away and then one frame per tick. Inbound
//! messages other than Close and Ping are ignored.

use crate::engine::TelemetryEngine;
use crate::metrics::SNAPSHOTS_SENT_TOTAL;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use std::sync::Arc;
use tracing::{debug, error, trace};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(engine): State<Arc<TelemetryEngine>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, engine))
}

async fn handle_socket(mut socket: WebSocket, engine: Arc<TelemetryEngine>) {
    let mut session = match engine.join().await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to attach viewer: {}", e);
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };
    let id = session.id();

    loop {
        tokio::select! {
            frame = session.next_frame() => {
                match frame {
                    Some(frame) => {
                        if socket.send(Message::Text(frame.text.to_string())).await.is_err() {
                            debug!(session = %id, "Send failed, viewer disconnected");
                            break;
                        }
                        SNAPSHOTS_SENT_TOTAL.inc();
                    }
                    None => {
                        // Broadcaster closed us during shutdown
                        let _ = socket.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        trace!(session = %id, "Ignoring inbound viewer message");
                    }
                    Some(Err(e)) => {
                        debug!(session = %id, "WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    engine.leave(id).await;
}
