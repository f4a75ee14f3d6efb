//! Executor agent - shell command execution with captured output

use std::process::Stdio;

use async_trait::async_trait;
use serde_json::json;
use tokio::process::Command;

use crate::agent::contract::{Agent, AgentContext, Capability};
use crate::agent::envelope::{ResponseEnvelope, Task};
use crate::config::AgentProfile;

const MAX_OUTPUT_BYTES: usize = 50_000;

/// Runs the task request as a shell command in the dispatch working
/// directory and reports captured stdout/stderr plus the exit status.
///
/// Timeout enforcement lives in the registry's dispatch wrapper, not here.
pub struct ShellAgent {
    name: String,
    role: String,
}

const CAPABILITIES: &[Capability] = &[Capability::Execute];

impl Default for ShellAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellAgent {
    pub fn new() -> Self {
        Self {
            name: "Executor".to_string(),
            role: "Command execution".to_string(),
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

/// Keep the tail of a string within `max_bytes`, preserving UTF-8 boundaries.
fn tail_by_bytes(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }

    let mut start = text.len().saturating_sub(max_bytes);
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    format!("[... output truncated ...]\n{}", &text[start..])
}

#[async_trait]
impl Agent for ShellAgent {
    fn id(&self) -> &str {
        "executor"
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

    async fn process_task(&self, task: &Task, ctx: &AgentContext) -> ResponseEnvelope {
        #[cfg(unix)]
        let mut command = {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&task.request);
            c
        };
        #[cfg(windows)]
        let mut command = {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&task.request);
            c
        };

        let output = command
            .current_dir(&ctx.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => return self.handle_error(&e, task),
        };

        let stdout = tail_by_bytes(&String::from_utf8_lossy(&output.stdout), MAX_OUTPUT_BYTES);
        let stderr = tail_by_bytes(&String::from_utf8_lossy(&output.stderr), MAX_OUTPUT_BYTES);
        let exit_code = output.status.code();

        if output.status.success() {
            let content = if stdout.trim().is_empty() {
                "(no output)".to_string()
            } else {
                stdout.clone()
            };
            ResponseEnvelope::success(self.id(), self.name(), content)
                .with_response_type("command")
                .with_data(json!({ "exit_code": exit_code, "stderr": stderr }))
        } else {
            let content = format!(
                "Command exited with {:?}\n{}",
                exit_code,
                if stderr.trim().is_empty() {
                    &stdout
                } else {
                    &stderr
                }
            );
            ResponseEnvelope::error(self.id(), self.name(), content)
                .with_response_type("command")
                .with_data(json!({ "exit_code": exit_code, "stdout": stdout, "stderr": stderr }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_by_bytes_truncates() {
        let long = "x".repeat(100);
        let tail = tail_by_bytes(&long, 10);
        assert!(tail.contains("truncated"));
        assert!(tail.ends_with(&"x".repeat(10)));

        assert_eq!(tail_by_bytes("short", 10), "short");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_command_captures_stdout() {
        let agent = ShellAgent::new();
        let task = Task::new("echo hello");
        let env = agent.process_task(&task, &AgentContext::default()).await;

        assert!(!env.is_error());
        assert_eq!(env.content.trim(), "hello");
        assert_eq!(env.data.unwrap()["exit_code"], 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_yields_error_envelope() {
        let agent = ShellAgent::new();
        let task = Task::new("exit 3");
        let env = agent.process_task(&task, &AgentContext::default()).await;

        assert!(env.is_error());
        assert_eq!(env.data.unwrap()["exit_code"], 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let agent = ShellAgent::new();
        let ctx = AgentContext::new(dir.path().to_path_buf());
        let env = agent.process_task(&Task::new("pwd"), &ctx).await;

        assert!(!env.is_error());
        // Canonicalize to survive symlinked temp dirs (e.g. /tmp on macOS).
        let reported = std::path::Path::new(env.content.trim())
            .canonicalize()
            .unwrap();
        assert_eq!(reported, dir.path().canonicalize().unwrap());
    }
}
