//! Manta server binary entry point.
//!
//! Loads TOML configuration, builds the root command table, and runs the
//! axum server with graceful shutdown on ctrl-c.

use anyhow::Result;
use manta_server::commands::version::{self, VersionInfo};
use manta_server::{Command, ServerConfig, serve};
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing from RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load configuration, defaulting when no path is given.
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let config = ServerConfig::load(Path::new(&path))?;
            tracing::info!("loaded configuration from {path}");
            config
        }
        None => ServerConfig::default(),
    };

    let info = VersionInfo::current(config.build.commit.clone(), config.build.repo.clone());
    let root = Arc::new(
        Command::group()
            .describe("Manta command root")
            .subcommand("version", version::command(info)),
    );

    let handle = serve(root, config.bind_address()).await?;

    signal::ctrl_c().await?;
    tracing::info!("shutting down");
    handle.shutdown().await?;
    Ok(())
}
