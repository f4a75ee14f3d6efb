//! Data sync agent - HTTP probe against external services

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::agent::contract::{Agent, AgentContext, Capability};
use crate::agent::envelope::{ResponseEnvelope, Task};
use crate::config::AgentProfile;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Probes an external HTTP endpoint and reports status and size.
///
/// The target URL comes from the task context (`url`) or the first
/// `http(s)://` token in the request text.
pub struct SyncAgent {
    name: String,
    role: String,
    client: reqwest::Client,
}

const CAPABILITIES: &[Capability] = &[Capability::Sync];

impl Default for SyncAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncAgent {
    pub fn new() -> Self {
        Self {
            name: "Data Sync".to_string(),
            role: "External services".to_string(),
            client: reqwest::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .user_agent(concat!("colony/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
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

/// Extract the target URL from context or request text.
fn target_url(task: &Task) -> Option<String> {
    if let Some(url) = task.context.get("url").and_then(|v| v.as_str()) {
        return Some(url.to_string());
    }
    task.request
        .split_whitespace()
        .find(|token| token.starts_with("http://") || token.starts_with("https://"))
        .map(str::to_string)
}

#[async_trait]
impl Agent for SyncAgent {
    fn id(&self) -> &str {
        "data_sync"
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
        let Some(url) = target_url(task) else {
            return self.handle_error(&"no target url in task context or request", task);
        };

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return self.handle_error(&e, task),
        };

        let status = response.status();
        let content_length = response.content_length();
        let body_bytes = match response.bytes().await {
            Ok(bytes) => bytes.len(),
            Err(_) => 0,
        };

        let data = json!({
            "url": url,
            "status": status.as_u16(),
            "content_length": content_length,
            "body_bytes": body_bytes,
        });

        if status.is_success() {
            ResponseEnvelope::success(
                self.id(),
                self.name(),
                format!("{} responded {} ({} bytes)", url, status, body_bytes),
            )
            .with_response_type("sync")
            .with_data(data)
        } else {
            ResponseEnvelope::error(
                self.id(),
                self.name(),
                format!("{} responded {}", url, status),
            )
            .with_response_type("sync")
            .with_data(data)
        }
    }
}
