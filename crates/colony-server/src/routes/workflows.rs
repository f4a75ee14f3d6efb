//! Workflow execution endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use colony_core::agent::orchestrator::ExecutionSummary;
use colony_core::{AgentContext, WorkflowExecution};

use crate::error::AppError;
use crate::types::{WorkflowExecuteRequest, WorkflowRunRequest, WorkflowTemplatesResponse};
use crate::ws::events::ServerEvent;
use crate::AppState;

/// Build the workflows router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_executions))
        .route("/templates", get(list_templates))
        .route("/execute", post(execute_workflow))
        .route("/run/:name", post(run_named_workflow))
        .route("/:id", get(get_execution))
}

/// List retained executions, newest first
async fn list_executions(State(state): State<AppState>) -> Json<Vec<ExecutionSummary>> {
    Json(state.executor.list().await)
}

/// List named workflow templates from config
async fn list_templates(State(state): State<AppState>) -> Json<WorkflowTemplatesResponse> {
    Json(WorkflowTemplatesResponse {
        templates: state.executor.template_names().await,
    })
}

/// Execute an inline workflow definition
async fn execute_workflow(
    State(state): State<AppState>,
    Json(req): Json<WorkflowExecuteRequest>,
) -> Result<Json<WorkflowExecution>, AppError> {
    if req.steps.is_empty() {
        return Err(AppError::BadRequest("workflow has no steps".to_string()));
    }

    let name = req.name.unwrap_or_else(|| "adhoc".to_string());
    let ctx = AgentContext::new((*state.working_dir).clone());

    state.publish(ServerEvent::WorkflowStarted { name: name.clone() });
    let execution = state
        .executor
        .execute(&name, &req.steps, &req.request, &ctx)
        .await;
    state.publish(ServerEvent::WorkflowFinished {
        workflow_id: execution.workflow_id.clone(),
        status: execution.status,
    });

    Ok(Json(execution))
}

/// Execute a named workflow template
async fn run_named_workflow(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<WorkflowRunRequest>,
) -> Result<Json<WorkflowExecution>, AppError> {
    let ctx = AgentContext::new((*state.working_dir).clone());

    state.publish(ServerEvent::WorkflowStarted { name: name.clone() });
    let execution = state
        .executor
        .execute_named(&name, &req.request, &ctx)
        .await?;
    state.publish(ServerEvent::WorkflowFinished {
        workflow_id: execution.workflow_id.clone(),
        status: execution.status,
    });

    Ok(Json(execution))
}

/// Get one execution by id
async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkflowExecution>, AppError> {
    state
        .executor
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("workflow execution '{}' not found", id)))
}
