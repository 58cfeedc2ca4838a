// src/routes/relay.rs
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    message::{ClientEvent, EventName, ServerEvent},
    services::relay::RelaySession,
    state::SharedState,
};

const REPLY_BUFFER: usize = 16;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> Response {
    debug!("relay websocket upgrade requested");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();
    let (reply_tx, mut reply_rx) = mpsc::channel::<ServerEvent>(REPLY_BUFFER);

    let session = RelaySession::open(&state, reply_tx).await;
    let session_id = session.id().to_string();

    let writer = tokio::spawn(async move {
        while let Some(event) = reply_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "failed to serialize reply");
                    continue;
                }
            };
            if sender.send(WsMessage::Text(json.into())).await.is_err() {
                debug!("client went away while sending reply");
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        let text = match frame {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(session_id = %session_id, error = %e, "websocket read failed");
                break;
            }
        };

        let result = match serde_json::from_str::<ClientEvent>(text.as_str()) {
            Ok(event) => session.handle(event).await,
            Err(e) => match serde_json::from_str::<EventName>(text.as_str()) {
                // A request still owes the client exactly one reply.
                Ok(name) if name.event == "request" => {
                    warn!(session_id = %session_id, error = %e, "unreadable request payload");
                    session.reject_turn().await
                }
                _ => {
                    warn!(session_id = %session_id, error = %e, "ignoring unrecognised frame");
                    Ok(())
                }
            },
        };

        if let Err(e) = result {
            warn!(session_id = %session_id, error = %e, "dropping connection");
            break;
        }
    }

    session.close().await;
    writer.abort();
    info!(session_id = %session_id, "relay websocket closed");
}
