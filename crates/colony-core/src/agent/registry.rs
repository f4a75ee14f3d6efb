//! Agent registry
//!
//! Holds the set of available agents and answers "who can handle this".
//! Dispatch goes through the registry so every call gets the same treatment:
//! input validation, status transitions, a timeout, metrics, and a
//! communication-log record.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::agent::comm_log::{CommEntry, CommunicationLog};
use crate::agent::contract::{Agent, AgentContext, Capability};
use crate::agent::envelope::{AgentStatus, ResponseEnvelope, Task};
use crate::error::DispatchError;

/// Default dispatch timeout (2 minutes).
const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-agent performance counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentMetrics {
    pub tasks_completed: u64,
    pub errors: u64,
    pub success_rate: f64,
    pub avg_response_ms: f64,
}

impl AgentMetrics {
    fn record(&mut self, success: bool, elapsed: Duration) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let total = self.tasks_completed as f64;
        self.avg_response_ms = (self.avg_response_ms * total + elapsed_ms) / (total + 1.0);
        self.tasks_completed += 1;
        if !success {
            self.errors += 1;
        }
        self.success_rate =
            (self.tasks_completed - self.errors) as f64 / self.tasks_completed as f64;
    }
}

/// Snapshot of a registered agent for status APIs.
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub id: String,
    pub name: String,
    pub role: String,
    pub capabilities: Vec<Capability>,
    pub status: AgentStatus,
    pub metrics: AgentMetrics,
}

struct AgentEntry {
    agent: Arc<dyn Agent>,
    status: AgentStatus,
    metrics: AgentMetrics,
}

/// Registry mapping agent ids to agent instances.
pub struct AgentRegistry {
    entries: RwLock<HashMap<String, AgentEntry>>,
    /// Insertion order for stable listing.
    order: RwLock<Vec<String>>,
    comm_log: Arc<CommunicationLog>,
    default_timeout: Duration,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            order: RwLock::new(Vec::new()),
            comm_log: Arc::new(CommunicationLog::default()),
            default_timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Register an agent. Last write wins on a duplicate id; the overwrite is
    /// logged so it does not pass silently.
    pub async fn register(&self, agent: Arc<dyn Agent>) {
        let id = agent.id().to_string();
        let mut entries = self.entries.write().await;

        if entries.contains_key(&id) {
            tracing::warn!(agent_id = %id, "duplicate registration, replacing existing agent");
        } else {
            self.order.write().await.push(id.clone());
        }

        tracing::info!(agent_id = %id, name = agent.name(), "registered agent");
        entries.insert(
            id,
            AgentEntry {
                agent,
                status: AgentStatus::Ready,
                metrics: AgentMetrics::default(),
            },
        );
    }

    /// Look up an agent by id. A miss is an absent value, never a panic.
    pub async fn get(&self, id: &str) -> Option<Arc<dyn Agent>> {
        let entries = self.entries.read().await;
        entries.get(id).map(|e| e.agent.clone())
    }

    /// Snapshot of all registered agents in insertion order.
    pub async fn list(&self) -> Vec<AgentInfo> {
        let entries = self.entries.read().await;
        let order = self.order.read().await;
        order
            .iter()
            .filter_map(|id| entries.get(id))
            .map(|e| AgentInfo {
                id: e.agent.id().to_string(),
                name: e.agent.name().to_string(),
                role: e.agent.role().to_string(),
                capabilities: e.agent.capabilities().to_vec(),
                status: e.status,
                metrics: e.metrics.clone(),
            })
            .collect()
    }

    /// Snapshot of one agent.
    pub async fn info(&self, id: &str) -> Option<AgentInfo> {
        let entries = self.entries.read().await;
        entries.get(id).map(|e| AgentInfo {
            id: e.agent.id().to_string(),
            name: e.agent.name().to_string(),
            role: e.agent.role().to_string(),
            capabilities: e.agent.capabilities().to_vec(),
            status: e.status,
            metrics: e.metrics.clone(),
        })
    }

    pub async fn agent_count(&self) -> usize {
        self.entries.read().await.len()
    }

    pub fn comm_log(&self) -> Arc<CommunicationLog> {
        self.comm_log.clone()
    }

    pub async fn set_status(&self, id: &str, status: AgentStatus) {
        if let Some(entry) = self.entries.write().await.get_mut(id) {
            entry.status = status;
        }
    }

    /// Pick the best ready agent for a task.
    ///
    /// Scoring: an exact match on `preferred_capability` from the task context
    /// beats a keyword-inferred capability match, which beats any ready agent.
    /// Ties resolve in registration order.
    pub async fn find_best(&self, task: &Task) -> Option<Arc<dyn Agent>> {
        let preferred: Option<Capability> = task
            .context
            .get("preferred_capability")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok());
        let inferred = Capability::infer(&task.request);

        let entries = self.entries.read().await;
        let order = self.order.read().await;

        let mut best: Option<(i32, Arc<dyn Agent>)> = None;
        for id in order.iter() {
            let Some(entry) = entries.get(id) else {
                continue;
            };
            if entry.status != AgentStatus::Ready {
                continue;
            }

            let caps = entry.agent.capabilities();
            let score = if preferred.is_some_and(|c| caps.contains(&c)) {
                10
            } else if inferred.is_some_and(|c| caps.contains(&c)) {
                8
            } else {
                5
            };

            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, entry.agent.clone()));
            }
        }

        best.map(|(_, agent)| agent)
    }

    /// Dispatch a task to a named agent.
    ///
    /// Returns `Err` only when the agent id is unknown. Validation failures,
    /// processing errors, and timeouts all come back as error-status
    /// envelopes so the response shape holds on every path.
    pub async fn dispatch(
        &self,
        agent_id: &str,
        task: &Task,
        ctx: &AgentContext,
    ) -> Result<ResponseEnvelope, DispatchError> {
        let agent = self
            .get(agent_id)
            .await
            .ok_or_else(|| DispatchError::AgentNotFound(agent_id.to_string()))?;

        if let Err(e) = agent.validate_input(task) {
            let envelope = agent.handle_error(&e, task);
            self.finish_dispatch(agent_id, task, &envelope, Duration::ZERO)
                .await;
            return Ok(envelope);
        }

        self.set_status(agent_id, AgentStatus::Processing).await;
        let timeout = ctx.timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();

        let envelope = match tokio::time::timeout(timeout, agent.process_task(task, ctx)).await {
            Ok(envelope) => envelope,
            Err(_) => {
                tracing::warn!(
                    agent_id,
                    timeout_secs = timeout.as_secs(),
                    "agent dispatch timed out"
                );
                agent
                    .handle_error(
                        &format!("timed out after {} seconds", timeout.as_secs()),
                        task,
                    )
                    .with_response_type("timeout")
            }
        };

        self.finish_dispatch(agent_id, task, &envelope, start.elapsed())
            .await;
        Ok(envelope)
    }

    async fn finish_dispatch(
        &self,
        agent_id: &str,
        task: &Task,
        envelope: &ResponseEnvelope,
        elapsed: Duration,
    ) {
        let success = !envelope.is_error();
        {
            let mut entries = self.entries.write().await;
            if let Some(entry) = entries.get_mut(agent_id) {
                entry.metrics.record(success, elapsed);
                entry.status = if success {
                    AgentStatus::Ready
                } else {
                    AgentStatus::Error
                };
            }
        }

        self.comm_log
            .record(CommEntry {
                timestamp: Utc::now(),
                agent_id: agent_id.to_string(),
                task_id: task.task_id.clone(),
                request: task.request.clone(),
                status: envelope.status,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoAgent {
        id: &'static str,
        caps: Vec<Capability>,
    }

    impl EchoAgent {
        fn new(id: &'static str, caps: Vec<Capability>) -> Arc<Self> {
            Arc::new(Self { id, caps })
        }
    }

    #[async_trait]
    impl Agent for EchoAgent {
        fn id(&self) -> &str {
            self.id
        }
        fn name(&self) -> &str {
            "Echo"
        }
        fn role(&self) -> &str {
            "Test"
        }
        fn capabilities(&self) -> &[Capability] {
            &self.caps
        }
        async fn process_task(&self, task: &Task, _ctx: &AgentContext) -> ResponseEnvelope {
            ResponseEnvelope::success(self.id, "Echo", task.request.clone())
        }
    }

    struct SlowAgent;

    #[async_trait]
    impl Agent for SlowAgent {
        fn id(&self) -> &str {
            "slow"
        }
        fn name(&self) -> &str {
            "Slow"
        }
        fn role(&self) -> &str {
            "Test"
        }
        fn capabilities(&self) -> &[Capability] {
            &[]
        }
        async fn process_task(&self, task: &Task, _ctx: &AgentContext) -> ResponseEnvelope {
            tokio::time::sleep(Duration::from_secs(5)).await;
            ResponseEnvelope::success("slow", "Slow", task.request.clone())
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_one_entry() {
        let registry = AgentRegistry::new();
        registry
            .register(EchoAgent::new("echo", vec![Capability::Plan]))
            .await;
        registry
            .register(EchoAgent::new("echo", vec![Capability::Execute]))
            .await;

        let agents = registry.list().await;
        assert_eq!(agents.len(), 1);
        // Last write wins.
        assert_eq!(agents[0].capabilities, vec![Capability::Execute]);
    }

    #[tokio::test]
    async fn test_get_unknown_agent_returns_none() {
        let registry = AgentRegistry::new();
        assert!(registry.get("nope").await.is_none());
        assert!(registry.info("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let registry = AgentRegistry::new();
        registry.register(EchoAgent::new("b", vec![])).await;
        registry.register(EchoAgent::new("a", vec![])).await;
        registry.register(EchoAgent::new("c", vec![])).await;

        let ids: Vec<String> = registry.list().await.into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_agent_is_tagged_failure() {
        let registry = AgentRegistry::new();
        let result = registry
            .dispatch("missing", &Task::new("do"), &AgentContext::default())
            .await;
        assert!(matches!(result, Err(DispatchError::AgentNotFound(_))));
    }

    #[tokio::test]
    async fn test_dispatch_updates_metrics_and_logs() {
        let registry = AgentRegistry::new();
        registry.register(EchoAgent::new("echo", vec![])).await;

        let env = registry
            .dispatch("echo", &Task::new("hello"), &AgentContext::default())
            .await
            .unwrap();
        assert!(!env.is_error());
        assert_eq!(env.content, "hello");

        let info = registry.info("echo").await.unwrap();
        assert_eq!(info.metrics.tasks_completed, 1);
        assert_eq!(info.metrics.errors, 0);
        assert_eq!(info.status, AgentStatus::Ready);
        assert_eq!(registry.comm_log().len().await, 1);
    }

    #[tokio::test]
    async fn test_dispatch_timeout_yields_error_envelope() {
        let registry = AgentRegistry::new();
        registry.register(Arc::new(SlowAgent)).await;

        let ctx = AgentContext::default().with_timeout(Duration::from_millis(20));
        let env = registry
            .dispatch("slow", &Task::new("hang"), &ctx)
            .await
            .unwrap();

        assert!(env.is_error());
        assert_eq!(env.response_type, "timeout");
        let info = registry.info("slow").await.unwrap();
        assert_eq!(info.status, AgentStatus::Error);
        assert_eq!(info.metrics.errors, 1);
    }

    #[tokio::test]
    async fn test_dispatch_invalid_task_returns_error_envelope() {
        let registry = AgentRegistry::new();
        registry.register(EchoAgent::new("echo", vec![])).await;

        let env = registry
            .dispatch("echo", &Task::new(""), &AgentContext::default())
            .await
            .unwrap();
        assert!(env.is_error());
        assert!(env.content.contains("request is empty"));
    }

    #[tokio::test]
    async fn test_find_best_prefers_capability_match() {
        let registry = AgentRegistry::new();
        registry
            .register(EchoAgent::new("generalist", vec![]))
            .await;
        registry
            .register(EchoAgent::new("planner", vec![Capability::Plan]))
            .await;

        let picked = registry
            .find_best(&Task::new("plan the rollout"))
            .await
            .unwrap();
        assert_eq!(picked.id(), "planner");

        // No keyword match: registration order breaks the tie.
        let picked = registry.find_best(&Task::new("hello")).await.unwrap();
        assert_eq!(picked.id(), "generalist");
    }
}
