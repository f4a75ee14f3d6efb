//! Colony server binary
//!
//! Thin wrapper over the library: logging init, env config, `start_server`.

use std::path::PathBuf;

use colony_server::{start_server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("COLONY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let config_path = std::env::var("COLONY_CONFIG").ok().map(PathBuf::from);

    let config = ServerConfig {
        port,
        config_path,
        ..Default::default()
    };

    start_server(config).await
}
