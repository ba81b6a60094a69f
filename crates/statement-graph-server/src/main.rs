//! Statement Graph server binary
//!
//! Loads configuration from a TOML file or the environment (including `.env`)
//! and serves the ingestion API.

use anyhow::Context;
use clap::Parser;
use statement_graph_server::{config::ServerConfig, start_server};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Transcription ingestion server for the statement graph
#[derive(Debug, Parser)]
#[command(name = "statement-graph-server", version, about)]
struct Cli {
    /// TOML configuration file; environment variables are used when omitted
    #[arg(long, env = "STATEMENT_GRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::from_env().context("loading configuration from environment")?,
    };
    if let Some(port) = cli.port {
        config.bind_port = port;
    }

    start_server(config).await?;
    Ok(())
}
