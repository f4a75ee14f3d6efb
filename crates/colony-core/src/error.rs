//! Core error types

/// Errors surfaced by the dispatch and orchestration layer.
///
/// These are tagged values, not panics: a registry miss or an invalid task
/// is an expected outcome that callers (HTTP handlers, the CLI) turn into a
/// response. Agent-level processing failures and dispatch timeouts never
/// appear here — they are recovered at the agent boundary into an
/// error-status envelope, and failed workflow steps are recorded on the
/// execution itself.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("agent '{0}' not found in registry")]
    AgentNotFound(String),

    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("workflow template '{0}' not found")]
    WorkflowNotFound(String),
}
