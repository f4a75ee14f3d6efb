//! System status endpoints

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use colony_core::agent::comm_log::CommEntry;

use crate::types::{CommunicationsQuery, SystemStatusResponse};
use crate::AppState;

const RECENT_COMMUNICATIONS: usize = 10;
const MAX_COMMUNICATIONS: usize = 500;

/// Build the system router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(system_status))
        .route("/communications", get(communications))
}

/// Overall system status: agents, workflows, recent dispatches
async fn system_status(State(state): State<AppState>) -> Json<SystemStatusResponse> {
    let agents = state.registry.list().await;
    let recent = state
        .registry
        .comm_log()
        .recent(RECENT_COMMUNICATIONS)
        .await;

    Json(SystemStatusResponse {
        timestamp: chrono::Utc::now(),
        total_agents: agents.len(),
        running_workflows: state.executor.running_count().await,
        agents,
        recent_communications: recent,
    })
}

/// Recent communication-log entries
async fn communications(
    State(state): State<AppState>,
    Query(query): Query<CommunicationsQuery>,
) -> Json<Vec<CommEntry>> {
    let limit = query
        .limit
        .unwrap_or(RECENT_COMMUNICATIONS)
        .min(MAX_COMMUNICATIONS);
    Json(state.registry.comm_log().recent(limit).await)
}
