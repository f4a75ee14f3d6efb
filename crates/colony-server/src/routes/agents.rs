//! Agent listing and per-agent task endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use colony_core::agent::registry::AgentInfo;
use colony_core::{AgentContext, ResponseEnvelope, Task};

use crate::error::AppError;
use crate::types::TaskPayload;
use crate::ws::events::ServerEvent;
use crate::AppState;

/// Build the agents router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_agents))
        .route("/:id", get(get_agent))
        .route("/:id/task", post(submit_to_agent))
}

/// List all registered agents with status and metrics
async fn list_agents(State(state): State<AppState>) -> Json<Vec<AgentInfo>> {
    Json(state.registry.list().await)
}

/// Get one agent's status
async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AgentInfo>, AppError> {
    state
        .registry
        .info(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("agent '{}' not found", id)))
}

/// Dispatch a task to a specific agent (the dynamic per-agent endpoint)
async fn submit_to_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<ResponseEnvelope>, AppError> {
    let task: Task = payload.into();
    let ctx = AgentContext::new((*state.working_dir).clone());

    let envelope = state.registry.dispatch(&id, &task, &ctx).await?;
    if let Some(info) = state.registry.info(&id).await {
        state.publish(ServerEvent::AgentStatus {
            agent_id: id.clone(),
            status: info.status,
        });
    }
    state.publish(ServerEvent::TaskCompleted {
        agent_id: id,
        task_id: task.task_id,
        status: envelope.status,
    });

    Ok(Json(envelope))
}
