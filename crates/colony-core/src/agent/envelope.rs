//! Task and response envelope types
//!
//! Every agent, regardless of what it does internally, consumes a [`Task`]
//! and produces a [`ResponseEnvelope`]. The error path and the success path
//! are shape-compatible: both carry agent id, content, status, and timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Runtime status of a registered agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Ready,
    Processing,
    Error,
    Stopped,
}

/// Outcome of a single processed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Input envelope dispatched to an agent.
///
/// Consumed exactly once by one agent's `process_task`. The context may be
/// extended by the orchestrator before dispatch so later steps see earlier
/// step outputs; the agent itself treats the task as immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub request: String,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl Task {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            task_id: uuid::Uuid::new_v4().to_string(),
            request: request.into(),
            context: Map::new(),
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = task_id.into();
        self
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Insert a single context entry.
    pub fn with_context_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }
}

/// Normalized response shape returned by every agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub agent_id: String,
    pub agent_name: String,
    pub response_type: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub status: ResponseStatus,
    /// Optional structured payload alongside the human-readable content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(
        agent_id: impl Into<String>,
        agent_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_name: agent_name.into(),
            response_type: "standard".to_string(),
            content: content.into(),
            timestamp: Utc::now(),
            status: ResponseStatus::Success,
            data: None,
        }
    }

    pub fn error(
        agent_id: impl Into<String>,
        agent_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_name: agent_name.into(),
            response_type: "error".to_string(),
            content: content.into(),
            timestamp: Utc::now(),
            status: ResponseStatus::Error,
            data: None,
        }
    }

    pub fn with_response_type(mut self, response_type: impl Into<String>) -> Self {
        self.response_type = response_type.into();
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == ResponseStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_builder_generates_task_id() {
        let task = Task::new("do something");
        assert!(!task.task_id.is_empty());
        assert_eq!(task.request, "do something");
        assert!(task.context.is_empty());
    }

    #[test]
    fn test_task_context_values() {
        let task = Task::new("sync").with_context_value("url", json!("https://example.com"));
        assert_eq!(task.context["url"], "https://example.com");
    }

    #[test]
    fn test_envelope_success_and_error_share_shape() {
        let ok = ResponseEnvelope::success("a1", "Agent One", "done");
        let err = ResponseEnvelope::error("a1", "Agent One", "boom");

        for env in [&ok, &err] {
            let value = serde_json::to_value(env).unwrap();
            assert!(value.get("agent_id").is_some());
            assert!(value.get("content").is_some());
            assert!(value.get("status").is_some());
            assert!(value.get("timestamp").is_some());
        }

        assert_eq!(ok.status, ResponseStatus::Success);
        assert!(err.is_error());
        assert_eq!(err.response_type, "error");
    }

    #[test]
    fn test_envelope_serde_status_lowercase() {
        let env = ResponseEnvelope::success("a1", "Agent One", "ok");
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["status"], "success");
    }
}
