//! Task submission endpoints

use axum::{extract::State, routing::post, Json, Router};

use colony_core::{AgentContext, ResponseEnvelope, Task};

use crate::error::AppError;
use crate::types::{TaskRouteRequest, TaskSubmitRequest};
use crate::ws::events::ServerEvent;
use crate::AppState;

/// Build the tasks router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit_task))
        .route("/route", post(route_task))
}

/// Submit a task to a named agent
async fn submit_task(
    State(state): State<AppState>,
    Json(req): Json<TaskSubmitRequest>,
) -> Result<Json<ResponseEnvelope>, AppError> {
    let task: Task = req.task.into();
    let ctx = AgentContext::new((*state.working_dir).clone());

    let envelope = state.registry.dispatch(&req.agent_id, &task, &ctx).await?;
    if let Some(info) = state.registry.info(&req.agent_id).await {
        state.publish(ServerEvent::AgentStatus {
            agent_id: req.agent_id.clone(),
            status: info.status,
        });
    }
    state.publish(ServerEvent::TaskCompleted {
        agent_id: req.agent_id,
        task_id: task.task_id,
        status: envelope.status,
    });

    Ok(Json(envelope))
}

/// Submit a task without naming an agent; the registry picks the best match
async fn route_task(
    State(state): State<AppState>,
    Json(req): Json<TaskRouteRequest>,
) -> Result<Json<ResponseEnvelope>, AppError> {
    let task: Task = req.task.into();

    let agent = state
        .registry
        .find_best(&task)
        .await
        .ok_or_else(|| AppError::NotFound("no ready agent can handle this task".to_string()))?;
    let agent_id = agent.id().to_string();

    let ctx = AgentContext::new((*state.working_dir).clone());
    let envelope = state.registry.dispatch(&agent_id, &task, &ctx).await?;
    if let Some(info) = state.registry.info(&agent_id).await {
        state.publish(ServerEvent::AgentStatus {
            agent_id: agent_id.clone(),
            status: info.status,
        });
    }
    state.publish(ServerEvent::TaskCompleted {
        agent_id,
        task_id: task.task_id,
        status: envelope.status,
    });

    Ok(Json(envelope))
}
