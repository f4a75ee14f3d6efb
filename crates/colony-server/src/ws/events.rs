//! WebSocket event stream
//!
//! Subscribers on `/ws/events` receive every server event as a JSON text
//! frame: task completions, agent status changes, workflow transitions.
//! Clients may send `ping` frames and get a `pong` back; anything else from
//! the client is ignored.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;

use colony_core::{AgentStatus, ResponseStatus, WorkflowStatus};

use crate::AppState;

/// Events broadcast to WebSocket subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    TaskCompleted {
        agent_id: String,
        task_id: String,
        status: ResponseStatus,
    },
    AgentStatus {
        agent_id: String,
        status: AgentStatus,
    },
    WorkflowStarted {
        name: String,
    },
    WorkflowFinished {
        workflow_id: String,
        status: WorkflowStatus,
    },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Ping,
}

pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let mut events = state.events.subscribe();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let Ok(text) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if sink.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "ws subscriber lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            message = stream.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(ClientMessage::Ping) = serde_json::from_str(&text) {
                            let pong = serde_json::json!({ "type": "pong" });
                            if sink.send(Message::Text(pong.to_string())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("ws receive error: {}", e);
                        break;
                    }
                }
            }
        }
    }
}
