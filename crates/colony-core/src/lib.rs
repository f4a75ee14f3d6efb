//! Colony core library
//!
//! Agent dispatch and workflow orchestration:
//! - `agent::registry` - Agent registry with typed capability lookup
//! - `agent::contract` - The `Agent` trait every agent implements
//! - `agent::orchestrator` - Sequential workflow execution with shared context
//! - `agents` - Built-in agent implementations
//! - `config` - YAML configuration (agent profiles, workflow templates)

pub mod agent;
pub mod agents;
pub mod config;
pub mod error;

pub use agent::contract::{Agent, AgentContext, Capability};
pub use agent::envelope::{AgentStatus, ResponseEnvelope, ResponseStatus, Task};
pub use agent::orchestrator::{
    WorkflowExecution, WorkflowExecutor, WorkflowStatus, WorkflowStep,
};
pub use agent::registry::AgentRegistry;
pub use config::ColonyConfig;
pub use error::DispatchError;
