//! Planner agent - deterministic request decomposition

use async_trait::async_trait;
use serde_json::json;

use crate::agent::contract::{Agent, AgentContext, Capability};
use crate::agent::envelope::{ResponseEnvelope, Task};
use crate::config::AgentProfile;

/// Splits a free-form request into an ordered plan.
///
/// Segmentation is purely lexical (conjunctions and punctuation), so the
/// same request always produces the same plan.
pub struct PlannerAgent {
    name: String,
    role: String,
}

const CAPABILITIES: &[Capability] = &[Capability::Plan];

impl Default for PlannerAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl PlannerAgent {
    pub fn new() -> Self {
        Self {
            name: "Planner".to_string(),
            role: "Planning".to_string(),
        }
    }

    pub fn with_profile(mut self, profile: &AgentProfile) -> Self {
        if let Some(name) = &profile.name {
            self.name = name.clone();
        }
        if let Some(role) = &profile.role {
            self.role = role.clone();
        }
        self
    }
}

/// Split a request into plan steps on conjunctions and separators.
fn decompose(request: &str) -> Vec<String> {
    let mut segments = vec![request.to_string()];
    // Longest separators first so "and then" is not half-consumed by "then".
    for separator in [" and then ", " then ", " and ", "; ", ". "] {
        segments = segments
            .into_iter()
            .flat_map(|s| {
                s.split(separator)
                    .map(str::to_string)
                    .collect::<Vec<String>>()
            })
            .collect();
    }

    segments
        .into_iter()
        .map(|s| s.trim().trim_end_matches('.').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[async_trait]
impl Agent for PlannerAgent {
    fn id(&self) -> &str {
        "planner"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> &str {
        &self.role
    }

    fn capabilities(&self) -> &[Capability] {
        CAPABILITIES
    }

    async fn process_task(&self, task: &Task, _ctx: &AgentContext) -> ResponseEnvelope {
        let steps = decompose(&task.request);
        if steps.is_empty() {
            return self.handle_error(&"nothing to plan", task);
        }

        let mut content = format!("Plan ({} steps):\n", steps.len());
        for (i, step) in steps.iter().enumerate() {
            content.push_str(&format!("{}. {}\n", i + 1, step));
        }

        ResponseEnvelope::success(self.id(), self.name(), content)
            .with_response_type("plan")
            .with_data(json!({ "steps": steps }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_on_conjunctions() {
        let steps = decompose("write the docs and run the tests then publish");
        assert_eq!(steps, vec!["write the docs", "run the tests", "publish"]);
    }

    #[test]
    fn test_decompose_single_step() {
        assert_eq!(decompose("deploy"), vec!["deploy"]);
    }

    #[tokio::test]
    async fn test_plan_is_deterministic() {
        let agent = PlannerAgent::new();
        let task = Task::new("build the crate and publish it");

        let first = agent.process_task(&task, &AgentContext::default()).await;
        let second = agent.process_task(&task, &AgentContext::default()).await;

        assert!(!first.is_error());
        assert_eq!(first.content, second.content);
        assert_eq!(first.response_type, "plan");
        assert_eq!(first.data.unwrap()["steps"][0], "build the crate");
    }

    #[tokio::test]
    async fn test_empty_request_yields_error_envelope() {
        let agent = PlannerAgent::new();
        let task = Task::new("   .  ");
        let env = agent.process_task(&task, &AgentContext::default()).await;
        assert!(env.is_error());
    }
}
