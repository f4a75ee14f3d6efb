//! Built-in agent implementations
//!
//! - planner: deterministic request decomposition into an ordered plan
//! - executor: shell command execution with captured output
//! - data_sync: HTTP probe against external services

pub mod executor;
pub mod planner;
pub mod sync;

pub use executor::ShellAgent;
pub use planner::PlannerAgent;
pub use sync::SyncAgent;

use std::sync::Arc;

use crate::agent::contract::Agent;
use crate::agent::registry::AgentRegistry;
use crate::config::ColonyConfig;

/// Register all built-in agents, applying config display overrides.
pub async fn register_builtin_agents(registry: &AgentRegistry, config: &ColonyConfig) {
    let mut planner = PlannerAgent::new();
    if let Some(profile) = config.profile(planner.id()) {
        planner = planner.with_profile(profile);
    }
    registry.register(Arc::new(planner)).await;

    let mut shell = ShellAgent::new();
    if let Some(profile) = config.profile(shell.id()) {
        shell = shell.with_profile(profile);
    }
    registry.register(Arc::new(shell)).await;

    let mut sync = SyncAgent::new();
    if let Some(profile) = config.profile(sync.id()) {
        sync = sync.with_profile(profile);
    }
    registry.register(Arc::new(sync)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_builtin_agents() {
        let registry = AgentRegistry::new();
        register_builtin_agents(&registry, &ColonyConfig::default()).await;

        let ids: Vec<String> = registry.list().await.into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["planner", "executor", "data_sync"]);
    }

    #[tokio::test]
    async fn test_profile_overrides_apply() {
        let config: ColonyConfig = serde_yaml::from_str(
            r#"
agents:
  planner:
    name: Release Planner
    role: Planning
"#,
        )
        .unwrap();

        let registry = AgentRegistry::new();
        register_builtin_agents(&registry, &config).await;

        let info = registry.info("planner").await.unwrap();
        assert_eq!(info.name, "Release Planner");
        assert_eq!(info.role, "Planning");
    }
}
