//! YAML configuration
//!
//! A colony config carries display overrides for the built-in agents and
//! named workflow templates. A missing or unreadable file is not fatal: the
//! system starts with defaults and logs a warning, so a bad config never
//! prevents the registry from coming up.
//!
//! ```yaml
//! agents:
//!   planner:
//!     name: Release Planner
//!     role: Planning
//! workflows:
//!   release:
//!     - step_name: plan
//!       agent_id: planner
//!       action: plan the release
//!     - step_name: build
//!       agent_id: executor
//!       action: cargo build --release
//!       critical: true
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::orchestrator::WorkflowStep;

/// Display overrides for a built-in agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: Option<String>,
    pub role: Option<String>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColonyConfig {
    #[serde(default)]
    pub agents: HashMap<String, AgentProfile>,
    #[serde(default)]
    pub workflows: HashMap<String, Vec<WorkflowStep>>,
}

impl ColonyConfig {
    /// Load from a YAML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from a YAML file, falling back to defaults on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                tracing::info!(
                    path = %path.display(),
                    workflows = config.workflows.len(),
                    "loaded colony config"
                );
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "config unavailable, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn profile(&self, agent_id: &str) -> Option<&AgentProfile> {
        self.agents.get(agent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
agents:
  planner:
    name: Release Planner
workflows:
  release:
    - step_name: plan
      agent_id: planner
      action: plan the release
    - step_name: build
      agent_id: executor
      action: cargo build
      critical: false
"#;

    #[test]
    fn test_parse_workflow_templates() {
        let config: ColonyConfig = serde_yaml::from_str(SAMPLE).unwrap();

        assert_eq!(
            config.profile("planner").unwrap().name.as_deref(),
            Some("Release Planner")
        );
        let steps = &config.workflows["release"];
        assert_eq!(steps.len(), 2);
        // critical defaults to true when omitted.
        assert!(steps[0].critical);
        assert!(!steps[1].critical);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = ColonyConfig::load_or_default(Path::new("/nonexistent/colony.yaml"));
        assert!(config.agents.is_empty());
        assert!(config.workflows.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = ColonyConfig::load_or_default(file.path());
        assert_eq!(config.workflows.len(), 1);
    }
}
