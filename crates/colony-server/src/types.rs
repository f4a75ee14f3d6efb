//! Request and response types for the API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use colony_core::agent::comm_log::CommEntry;
use colony_core::agent::registry::AgentInfo;
use colony_core::{Task, WorkflowStep};

// ============================================================================
// Task Types
// ============================================================================

/// Task payload as submitted over the API. `task_id` is generated when absent.
#[derive(Deserialize)]
pub struct TaskPayload {
    pub task_id: Option<String>,
    pub request: String,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl From<TaskPayload> for Task {
    fn from(payload: TaskPayload) -> Self {
        let task = Task::new(payload.request).with_context(payload.context);
        match payload.task_id {
            Some(task_id) if !task_id.trim().is_empty() => task.with_task_id(task_id),
            _ => task,
        }
    }
}

#[derive(Deserialize)]
pub struct TaskSubmitRequest {
    pub agent_id: String,
    pub task: TaskPayload,
}

/// Auto-routed submission: the registry picks the agent.
#[derive(Deserialize)]
pub struct TaskRouteRequest {
    pub task: TaskPayload,
}

// ============================================================================
// Workflow Types
// ============================================================================

#[derive(Deserialize)]
pub struct WorkflowExecuteRequest {
    /// Display name for the execution (defaults to "adhoc").
    pub name: Option<String>,
    pub steps: Vec<WorkflowStep>,
    pub request: String,
}

#[derive(Deserialize)]
pub struct WorkflowRunRequest {
    pub request: String,
}

#[derive(Serialize)]
pub struct WorkflowTemplatesResponse {
    pub templates: Vec<String>,
}

// ============================================================================
// System Types
// ============================================================================

#[derive(Serialize)]
pub struct SystemStatusResponse {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub total_agents: usize,
    pub running_workflows: usize,
    pub agents: Vec<AgentInfo>,
    pub recent_communications: Vec<CommEntry>,
}

#[derive(Deserialize)]
pub struct CommunicationsQuery {
    pub limit: Option<usize>,
}
