//! The agent contract
//!
//! `Agent` is the minimal polymorphic interface: an id, a display name, a set
//! of typed capabilities, and `process_task`. Processing failures are handled
//! at this boundary — `handle_error` wraps them into an error-status envelope
//! so callers always receive the same shape.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agent::envelope::{ResponseEnvelope, Task};
use crate::error::DispatchError;

/// Typed capability flags used for dispatch routing.
///
/// Replaces attribute reflection: the registry checks a declared capability
/// instead of probing for optional methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Decompose a request into an ordered plan.
    Plan,
    /// Execute commands in the local environment.
    Execute,
    /// Talk to external HTTP services.
    Sync,
    /// Participates in autonomous scheduling loops.
    Autonomous,
}

impl Capability {
    /// Infer the capability a free-form request most likely needs.
    pub fn infer(request: &str) -> Option<Self> {
        let lower = request.to_ascii_lowercase();
        if ["plan", "design", "outline", "break down"]
            .iter()
            .any(|kw| lower.contains(kw))
        {
            Some(Capability::Plan)
        } else if ["run", "execute", "command", "shell", "build"]
            .iter()
            .any(|kw| lower.contains(kw))
        {
            Some(Capability::Execute)
        } else if ["sync", "fetch", "http", "deploy", "probe", "url"]
            .iter()
            .any(|kw| lower.contains(kw))
        {
            Some(Capability::Sync)
        } else {
            None
        }
    }
}

/// Per-dispatch execution context.
pub struct AgentContext {
    /// Working directory for agents that touch the local environment.
    pub working_dir: PathBuf,
    /// Optional per-dispatch timeout override.
    pub timeout: Option<Duration>,
}

impl Default for AgentContext {
    fn default() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            timeout: None,
        }
    }
}

impl AgentContext {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Trait implemented by every agent.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique agent id used for registry lookup.
    fn id(&self) -> &str;

    /// Human-readable display name.
    fn name(&self) -> &str;

    /// Role description shown in status listings.
    fn role(&self) -> &str;

    /// Declared capabilities for routing.
    fn capabilities(&self) -> &[Capability];

    /// Process a single task, returning the normalized envelope.
    ///
    /// Implementations must not panic on bad input; recover failures through
    /// [`Agent::handle_error`] so the envelope shape holds on every path.
    async fn process_task(&self, task: &Task, ctx: &AgentContext) -> ResponseEnvelope;

    /// Check a task carries the required fields before processing.
    fn validate_input(&self, task: &Task) -> Result<(), DispatchError> {
        if task.task_id.trim().is_empty() {
            return Err(DispatchError::InvalidTask("task_id is empty".to_string()));
        }
        if task.request.trim().is_empty() {
            return Err(DispatchError::InvalidTask("request is empty".to_string()));
        }
        Ok(())
    }

    /// Wrap a processing failure into an error envelope carrying the message
    /// and the original request snippet.
    fn handle_error(&self, error: &dyn std::fmt::Display, task: &Task) -> ResponseEnvelope {
        let message = format!("Error in {}: {}", self.name(), error);
        tracing::error!(agent_id = self.id(), task_id = %task.task_id, "{}", message);
        ResponseEnvelope::error(
            self.id(),
            self.name(),
            format!("{}\n\nTask: {}", message, snippet(&task.request)),
        )
    }
}

/// First line of a request, truncated for log/envelope embedding.
fn snippet(request: &str) -> String {
    const MAX: usize = 120;
    let first_line = request.lines().next().unwrap_or_default();
    let mut end = first_line.len().min(MAX);
    while end < first_line.len() && !first_line.is_char_boundary(end) {
        end += 1;
    }
    if end < first_line.len() || request.lines().count() > 1 {
        format!("{}...", &first_line[..end])
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubAgent;

    #[async_trait]
    impl Agent for StubAgent {
        fn id(&self) -> &str {
            "stub"
        }
        fn name(&self) -> &str {
            "Stub"
        }
        fn role(&self) -> &str {
            "Test"
        }
        fn capabilities(&self) -> &[Capability] {
            &[Capability::Plan]
        }
        async fn process_task(&self, _task: &Task, _ctx: &AgentContext) -> ResponseEnvelope {
            ResponseEnvelope::success("stub", "Stub", "ok")
        }
    }

    #[test]
    fn test_validate_input_rejects_empty_fields() {
        let agent = StubAgent;
        let empty_request = Task::new("").with_task_id("t1");
        assert!(agent.validate_input(&empty_request).is_err());

        let empty_id = Task::new("do it").with_task_id("");
        assert!(agent.validate_input(&empty_id).is_err());

        let valid = Task::new("do it");
        assert!(agent.validate_input(&valid).is_ok());
    }

    #[test]
    fn test_handle_error_produces_error_envelope_with_snippet() {
        let agent = StubAgent;
        let task = Task::new("deploy the thing");
        let env = agent.handle_error(&"connection refused", &task);

        assert!(env.is_error());
        assert_eq!(env.agent_id, "stub");
        assert!(env.content.contains("connection refused"));
        assert!(env.content.contains("deploy the thing"));
    }

    #[test]
    fn test_capability_inference() {
        assert_eq!(Capability::infer("plan a release"), Some(Capability::Plan));
        assert_eq!(
            Capability::infer("run the test suite"),
            Some(Capability::Execute)
        );
        assert_eq!(
            Capability::infer("fetch https://example.com"),
            Some(Capability::Sync)
        );
        assert_eq!(Capability::infer("hello"), None);
    }
}
