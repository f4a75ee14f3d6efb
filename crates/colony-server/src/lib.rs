//! Colony Server
//!
//! HTTP and WebSocket surface over the agent registry and workflow executor.
//! This is a library crate — the server is started via `start_server()`.
//!
//! The registry and executor are constructed here and passed through
//! `AppState`; there are no module-level singletons.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::Method,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::sync::broadcast;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use colony_core::agents::register_builtin_agents;
use colony_core::{AgentRegistry, ColonyConfig, WorkflowExecutor};

pub mod error;
pub mod routes;
pub mod types;
pub mod ws;

use ws::events::ServerEvent;

/// Capacity of the server event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for starting the server.
pub struct ServerConfig {
    /// Port to listen on (default: 3000).
    pub port: u16,
    /// Working directory handed to dispatched agents.
    pub working_dir: PathBuf,
    /// Optional path to a colony.yaml config file.
    pub config_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_path: None,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AgentRegistry>,
    pub executor: Arc<WorkflowExecutor>,
    pub working_dir: Arc<PathBuf>,
    /// Fan-out channel for WebSocket event subscribers.
    pub events: broadcast::Sender<ServerEvent>,
}

impl AppState {
    /// Broadcast a server event; silently drops when nobody is subscribed.
    pub fn publish(&self, event: ServerEvent) {
        let _ = self.events.send(event);
    }
}

/// Build the Axum router and application state.
pub async fn build_router(config: &ServerConfig) -> anyhow::Result<(Router, AppState)> {
    let colony_config = match &config.config_path {
        Some(path) => ColonyConfig::load_or_default(path),
        None => ColonyConfig::default(),
    };

    let registry = Arc::new(AgentRegistry::new());
    register_builtin_agents(&registry, &colony_config).await;

    let executor = Arc::new(WorkflowExecutor::new(registry.clone()));
    executor.load_templates(colony_config.workflows).await;

    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    let state = AppState {
        registry,
        executor,
        working_dir: Arc::new(config.working_dir.clone()),
        events,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ws/events", get(ws::events::handler))
        .nest("/api", routes::api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    Ok((app, state))
}

/// Start the Colony server and block until shutdown.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let (app, state) = build_router(&config).await?;

    tracing::info!(
        agents = state.registry.agent_count().await,
        "Colony server listening on http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        agents: state.registry.agent_count().await,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    agents: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_router_registers_builtins() {
        let config = ServerConfig::default();
        let (_app, state) = build_router(&config).await.unwrap();

        assert_eq!(state.registry.agent_count().await, 3);
        assert!(state.executor.template_names().await.is_empty());
    }
}
