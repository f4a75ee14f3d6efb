//! Agent system for Colony
//!
//! ## Registry (dispatch lookup)
//! - `AgentRegistry` - id → agent mapping with status, metrics, and timeout-wrapped dispatch
//! - `AgentInfo` / `AgentMetrics` - snapshot types for status APIs
//!
//! ## Contract
//! - `Agent` - the one real interface: `process_task(task) -> envelope`
//! - `Capability` - typed capability flags (no attribute reflection)
//! - `AgentContext` - per-dispatch execution context
//!
//! ## Orchestrator
//! - `WorkflowExecutor` - strictly sequential step execution, shared context
//!   threaded forward, critical/non-critical failure policy
//!
//! ## Communication log
//! - `CommunicationLog` - bounded ring buffer of dispatch records

pub mod comm_log;
pub mod contract;
pub mod envelope;
pub mod orchestrator;
pub mod registry;

pub use comm_log::{CommEntry, CommunicationLog};
pub use contract::{Agent, AgentContext, Capability};
pub use envelope::{AgentStatus, ResponseEnvelope, ResponseStatus, Task};
pub use orchestrator::{
    ExecutionSummary, StepResult, StepStatus, WorkflowExecution, WorkflowExecutor, WorkflowStatus,
    WorkflowStep,
};
pub use registry::{AgentInfo, AgentMetrics, AgentRegistry};
