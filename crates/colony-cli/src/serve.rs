//! `colony serve` — run the API server

use std::path::PathBuf;

use anyhow::Result;

/// Run the serve command.
pub async fn run(port: u16, config_path: Option<PathBuf>) -> Result<()> {
    print_banner(port);

    let config = colony_server::ServerConfig {
        port,
        config_path,
        ..Default::default()
    };

    colony_server::start_server(config).await
}

fn print_banner(port: u16) {
    println!();
    println!("  Colony v{}", env!("CARGO_PKG_VERSION"));
    println!("  API:       http://localhost:{port}/api");
    println!("  Events:    ws://localhost:{port}/ws/events");
    println!("  Health:    http://localhost:{port}/health");
    println!();
}
