use crate::auth::Actor;
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use matching_engine::MarketEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Stream every marketplace event to the caller as JSON text frames
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>, actor: Actor) -> Response {
    // Subscribe before the upgrade so nothing published in between is lost
    let events = state.events.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, events, actor))
}

async fn handle_socket(socket: WebSocket, mut events: broadcast::Receiver<MarketEvent>, actor: Actor) {
    let connection_id = Uuid::now_v7();
    info!(%connection_id, user_id = %actor.user_id, "Event stream opened");

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(err) => {
                            warn!(%connection_id, error = %err, "Failed to encode event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%connection_id, skipped, "Event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(Message::Ping(payload))) => {
                    if sender.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(other)) => debug!(%connection_id, ?other, "Ignoring client frame"),
            },
        }
    }

    info!(%connection_id, "Event stream closed");
}
