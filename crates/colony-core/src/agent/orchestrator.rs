//! Workflow orchestrator
//!
//! Runs a declarative list of steps, each naming an agent and an action.
//! Steps execute strictly in declared order; a shared context map is threaded
//! forward so each step sees the recorded outputs of every earlier step.
//!
//! Failure policy: a failing step marked `critical` halts the execution and
//! marks it failed; a non-critical failure is recorded in the step's own
//! result and execution continues. No agent after a critical failure is
//! invoked.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::agent::contract::AgentContext;
use crate::agent::envelope::{ResponseEnvelope, Task};
use crate::agent::registry::AgentRegistry;
use crate::error::DispatchError;

/// One declarative workflow step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub step_name: String,
    pub agent_id: String,
    pub action: String,
    /// A failing critical step halts the whole execution. Defaults to true.
    #[serde(default = "default_critical")]
    pub critical: bool,
}

fn default_critical() -> bool {
    true
}

/// Terminal and in-flight workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Running,
    Completed,
    Failed,
}

/// Outcome of a single executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Failed,
}

/// Recorded result of one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: String,
    pub agent_id: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope: Option<ResponseEnvelope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// A single workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub workflow_id: String,
    pub name: String,
    pub status: WorkflowStatus,
    /// Index of the step in flight (or the step that failed); equals the
    /// step count once every step has run.
    pub current_step: usize,
    pub steps: Vec<StepResult>,
    /// Envelopes of completed steps, keyed by step name.
    pub results: Map<String, Value>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Compact execution view for listings.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSummary {
    pub workflow_id: String,
    pub name: String,
    pub status: WorkflowStatus,
    pub step_count: usize,
    pub started_at: DateTime<Utc>,
}

/// Executes workflows against a registry and retains finished executions.
pub struct WorkflowExecutor {
    registry: Arc<AgentRegistry>,
    templates: RwLock<HashMap<String, Vec<WorkflowStep>>>,
    executions: RwLock<HashMap<String, WorkflowExecution>>,
}

impl WorkflowExecutor {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self {
            registry,
            templates: RwLock::new(HashMap::new()),
            executions: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> Arc<AgentRegistry> {
        self.registry.clone()
    }

    /// Install named workflow templates (typically from config).
    pub async fn load_templates(&self, templates: HashMap<String, Vec<WorkflowStep>>) {
        let mut guard = self.templates.write().await;
        for (name, steps) in templates {
            tracing::debug!(workflow = %name, steps = steps.len(), "loaded workflow template");
            guard.insert(name, steps);
        }
    }

    pub async fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Execute a named template.
    pub async fn execute_named(
        &self,
        name: &str,
        initial_request: &str,
        ctx: &AgentContext,
    ) -> Result<WorkflowExecution, DispatchError> {
        let steps = {
            let templates = self.templates.read().await;
            templates
                .get(name)
                .cloned()
                .ok_or_else(|| DispatchError::WorkflowNotFound(name.to_string()))?
        };
        Ok(self.execute(name, &steps, initial_request, ctx).await)
    }

    /// Execute an inline step list.
    ///
    /// Always returns the execution record; a failed run comes back with
    /// `status == Failed` and the failing step's error recorded, rather than
    /// as an `Err`. HTTP and CLI callers need a response either way.
    pub async fn execute(
        &self,
        name: &str,
        steps: &[WorkflowStep],
        initial_request: &str,
        ctx: &AgentContext,
    ) -> WorkflowExecution {
        let workflow_id = format!("{}-{}", name, uuid::Uuid::new_v4());
        tracing::info!(workflow_id = %workflow_id, steps = steps.len(), "starting workflow");

        let mut execution = WorkflowExecution {
            workflow_id: workflow_id.clone(),
            name: name.to_string(),
            status: WorkflowStatus::Running,
            current_step: 0,
            steps: Vec::with_capacity(steps.len()),
            results: Map::new(),
            started_at: Utc::now(),
            completed_at: None,
            error: None,
        };
        self.executions
            .write()
            .await
            .insert(workflow_id.clone(), execution.clone());

        let mut context = Map::new();
        context.insert("original_request".to_string(), json!(initial_request));

        for (i, step) in steps.iter().enumerate() {
            execution.current_step = i;

            let task = Task::new(&step.action)
                .with_task_id(format!("{workflow_id}-step-{i}"))
                .with_context(context.clone());

            let failure = match self.registry.dispatch(&step.agent_id, &task, ctx).await {
                Ok(envelope) if !envelope.is_error() => {
                    let value = serde_json::to_value(&envelope).unwrap_or(Value::Null);
                    context.insert(step.step_name.clone(), value.clone());
                    execution.results.insert(step.step_name.clone(), value);
                    execution.steps.push(StepResult {
                        step_name: step.step_name.clone(),
                        agent_id: step.agent_id.clone(),
                        status: StepStatus::Completed,
                        envelope: Some(envelope),
                        error: None,
                        completed_at: Utc::now(),
                    });
                    None
                }
                Ok(envelope) => {
                    let reason = envelope.content.clone();
                    execution.steps.push(StepResult {
                        step_name: step.step_name.clone(),
                        agent_id: step.agent_id.clone(),
                        status: StepStatus::Failed,
                        envelope: Some(envelope),
                        error: Some(reason.clone()),
                        completed_at: Utc::now(),
                    });
                    Some(reason)
                }
                Err(e) => {
                    let reason = e.to_string();
                    execution.steps.push(StepResult {
                        step_name: step.step_name.clone(),
                        agent_id: step.agent_id.clone(),
                        status: StepStatus::Failed,
                        envelope: None,
                        error: Some(reason.clone()),
                        completed_at: Utc::now(),
                    });
                    Some(reason)
                }
            };

            if let Some(reason) = failure {
                tracing::warn!(
                    workflow_id = %workflow_id,
                    step = %step.step_name,
                    critical = step.critical,
                    "workflow step failed: {}", reason
                );
                if step.critical {
                    execution.status = WorkflowStatus::Failed;
                    execution.error = Some(format!("step '{}' failed: {}", step.step_name, reason));
                    break;
                }
            }
        }

        if execution.status == WorkflowStatus::Running {
            execution.status = WorkflowStatus::Completed;
            execution.current_step = steps.len();
        }
        execution.completed_at = Some(Utc::now());

        tracing::info!(
            workflow_id = %workflow_id,
            status = ?execution.status,
            "workflow finished"
        );
        self.executions
            .write()
            .await
            .insert(workflow_id, execution.clone());

        execution
    }

    pub async fn get(&self, workflow_id: &str) -> Option<WorkflowExecution> {
        self.executions.read().await.get(workflow_id).cloned()
    }

    pub async fn list(&self) -> Vec<ExecutionSummary> {
        let executions = self.executions.read().await;
        let mut summaries: Vec<ExecutionSummary> = executions
            .values()
            .map(|e| ExecutionSummary {
                workflow_id: e.workflow_id.clone(),
                name: e.name.clone(),
                status: e.status,
                step_count: e.steps.len(),
                started_at: e.started_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        summaries
    }

    pub async fn running_count(&self) -> usize {
        self.executions
            .read()
            .await
            .values()
            .filter(|e| e.status == WorkflowStatus::Running)
            .count()
    }

    /// Relay a message from one agent to another.
    ///
    /// Builds a task whose context tags the sender, dispatches to the
    /// recipient, and records the exchange as `from->to` in the log.
    pub async fn send_between(
        &self,
        from_agent_id: &str,
        to_agent_id: &str,
        request: &str,
        ctx: &AgentContext,
    ) -> Result<ResponseEnvelope, DispatchError> {
        if self.registry.get(from_agent_id).await.is_none() {
            return Err(DispatchError::AgentNotFound(from_agent_id.to_string()));
        }

        let task = Task::new(request)
            .with_task_id(format!("comm-{}", uuid::Uuid::new_v4()))
            .with_context_value("from_agent", json!(from_agent_id))
            .with_context_value("communication_type", json!("inter_agent"));

        tracing::debug!(from = from_agent_id, to = to_agent_id, "inter-agent message");
        self.registry.dispatch(to_agent_id, &task, ctx).await
    }
}
