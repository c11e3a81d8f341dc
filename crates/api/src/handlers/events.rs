//! Websocket delivery of sync events.
//!
//! Each connection holds one branch subscription plus the caller's personal
//! subscription. Delivery is best-effort: a lagging client loses the oldest
//! buffered events and is expected to refetch its visible range on reconnect.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use shiftflow_core::models::event::SyncEvent;

use crate::ApiState;
use crate::middleware::actor::Actor;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub branch_id: Uuid,
}

#[axum::debug_handler]
pub async fn ws_events(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Query(query): Query<EventsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.branch_id, actor.staff_id))
}

async fn forward(socket: &mut WebSocket, event: SyncEvent) -> bool {
    match serde_json::to_string(&event) {
        Ok(payload) => socket.send(Message::Text(payload)).await.is_ok(),
        Err(e) => {
            tracing::warn!("Failed to serialize sync event: {}", e);
            true
        }
    }
}

async fn handle_socket(mut socket: WebSocket, state: Arc<ApiState>, branch_id: Uuid, staff_id: Uuid) {
    let mut branch_rx = state.dispatcher.subscribe_branch(branch_id).await;
    let mut staff_rx = state.dispatcher.subscribe_staff(staff_id).await;

    tracing::debug!(
        "Event socket open: branch={}, staff={}",
        branch_id,
        staff_id
    );

    loop {
        tokio::select! {
            event = branch_rx.recv() => match event {
                Ok(event) => {
                    if !forward(&mut socket, event).await {
                        break;
                    }
                }
                // Dropped events are fine, the client reconciles by refetching.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            event = staff_rx.recv() => match event {
                Ok(event) => {
                    if !forward(&mut socket, event).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(_)) => break,
            },
        }
    }

    tracing::debug!(
        "Event socket closed: branch={}, staff={}",
        branch_id,
        staff_id
    );
}
