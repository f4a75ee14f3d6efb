//! Colony - agent dispatch and workflow orchestration CLI
//!
//! - `colony serve` — run the HTTP/WebSocket API server
//! - `colony agents` — list registered agents
//! - `colony submit` — dispatch a single task to a named agent
//! - `colony run` — execute a named workflow template or a step file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use colony_core::agents::register_builtin_agents;
use colony_core::{
    AgentContext, AgentRegistry, ColonyConfig, Task, WorkflowExecutor, WorkflowStatus, WorkflowStep,
};

mod serve;

/// Colony - agent dispatch and workflow orchestration
#[derive(Parser)]
#[command(name = "colony")]
#[command(about = "Agent dispatch and workflow orchestration", long_about = None)]
struct Cli {
    /// Path to colony.yaml (agent profiles and workflow templates)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Colony API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },

    /// List registered agents
    Agents,

    /// Dispatch a single task to a named agent
    Submit {
        /// Agent id to dispatch to
        #[arg(short, long)]
        agent: String,
        /// The request text
        request: String,
    },

    /// Execute a workflow: a named template from config, or a step file
    Run {
        /// Workflow template name
        #[arg(short, long, conflicts_with = "file")]
        workflow: Option<String>,
        /// Path to a YAML or JSON file holding a step list
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// The initial request threaded into the workflow context
        request: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Serve mode logs at info by default; one-shot commands stay quiet so
    // their stdout is just the result.
    let default_filter = if matches!(cli.command, Commands::Serve { .. }) {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Serve { port } => serve::run(port, cli.config).await,
        Commands::Agents => list_agents(cli.config).await,
        Commands::Submit { agent, request } => submit(cli.config, &agent, &request).await,
        Commands::Run {
            workflow,
            file,
            request,
        } => run_workflow(cli.config, workflow, file, &request).await,
    }
}

/// Build an in-process registry and executor from config.
async fn bootstrap(config_path: Option<PathBuf>) -> (Arc<AgentRegistry>, WorkflowExecutor) {
    let config = match config_path {
        Some(path) => ColonyConfig::load_or_default(&path),
        None => ColonyConfig::default(),
    };

    let registry = Arc::new(AgentRegistry::new());
    register_builtin_agents(&registry, &config).await;

    let executor = WorkflowExecutor::new(registry.clone());
    executor.load_templates(config.workflows).await;

    (registry, executor)
}

async fn list_agents(config_path: Option<PathBuf>) -> Result<()> {
    let (registry, _) = bootstrap(config_path).await;

    for agent in registry.list().await {
        let caps: Vec<String> = agent
            .capabilities
            .iter()
            .map(|c| format!("{c:?}").to_lowercase())
            .collect();
        println!(
            "{:<12} {:<20} {:<24} [{}]",
            agent.id,
            agent.name,
            agent.role,
            caps.join(", ")
        );
    }

    Ok(())
}

async fn submit(config_path: Option<PathBuf>, agent_id: &str, request: &str) -> Result<()> {
    let (registry, _) = bootstrap(config_path).await;

    let task = Task::new(request);
    let envelope = registry
        .dispatch(agent_id, &task, &AgentContext::default())
        .await?;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if envelope.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_workflow(
    config_path: Option<PathBuf>,
    workflow: Option<String>,
    file: Option<PathBuf>,
    request: &str,
) -> Result<()> {
    let (_, executor) = bootstrap(config_path).await;

    let execution = match (workflow, file) {
        (Some(name), None) => {
            executor
                .execute_named(&name, request, &AgentContext::default())
                .await?
        }
        (None, Some(path)) => {
            let steps = load_steps(&path)?;
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("file")
                .to_string();
            executor
                .execute(&name, &steps, request, &AgentContext::default())
                .await
        }
        _ => anyhow::bail!("pass either --workflow <name> or --file <path>"),
    };

    println!("{}", serde_json::to_string_pretty(&execution)?);
    if execution.status == WorkflowStatus::Failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Read a workflow step list from a YAML or JSON file.
fn load_steps(path: &Path) -> Result<Vec<WorkflowStep>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading workflow file {}", path.display()))?;
    let steps: Vec<WorkflowStep> = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&raw)
            .with_context(|| format!("parsing workflow file {}", path.display()))?,
        _ => serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing workflow file {}", path.display()))?,
    };
    if steps.is_empty() {
        anyhow::bail!("workflow file {} holds no steps", path.display());
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_steps_yaml_with_critical_default() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "- step_name: plan\n  agent_id: planner\n  action: plan it\n\
             - step_name: probe\n  agent_id: data_sync\n  action: probe it\n  critical: false"
        )
        .unwrap();

        let steps = load_steps(file.path()).unwrap();
        assert_eq!(steps.len(), 2);
        assert!(steps[0].critical);
        assert!(!steps[1].critical);
    }

    #[test]
    fn test_load_steps_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"step_name":"plan","agent_id":"planner","action":"plan it"}}]"#
        )
        .unwrap();

        let steps = load_steps(file.path()).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].agent_id, "planner");
    }

    #[test]
    fn test_load_steps_rejects_empty_list() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "[]").unwrap();
        assert!(load_steps(file.path()).is_err());
    }

    #[tokio::test]
    async fn test_file_defined_workflow_runs_against_builtins() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "- step_name: plan\n  agent_id: planner\n  action: fetch data and report"
        )
        .unwrap();

        let (_, executor) = bootstrap(None).await;
        let steps = load_steps(file.path()).unwrap();
        let execution = executor
            .execute("adhoc", &steps, "fetch data and report", &AgentContext::default())
            .await;

        assert_eq!(execution.status, WorkflowStatus::Completed);
        assert!(execution.results.contains_key("plan"));
    }
}
