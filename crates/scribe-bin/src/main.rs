//! Stdio entry point: resolves repository configuration, wires tracing,
//! and serves the Scribe tool surface over standard input/output.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use scribe_mcp::ScribeServer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Scribe MCP server: mediates structured progress logging for
/// concurrent autonomous agents working in a shared repository.
#[derive(Parser)]
#[command(name = "scribe", author, version, about, long_about = None)]
struct Cli {
    /// Repository root to serve. Defaults to the nearest ancestor
    /// directory carrying a recognized root marker (`.git`, `.scribe`, …).
    #[arg(long)]
    repo_root: Option<PathBuf>,

    /// Enable debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let start_dir = match cli.repo_root {
        Some(path) => path,
        None => std::env::current_dir().context("resolving current directory")?,
    };
    let (repo_root, config) = scribe_config::discover_or_create(&start_dir)
        .context("discovering repository configuration")?;

    tracing::info!(repo_root = %repo_root.display(), "starting scribe");

    let server = ScribeServer::connect(repo_root, config)
        .await
        .context("connecting scribe server")?;

    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("error starting server: {e}");
    })?;

    service.waiting().await?;
    Ok(())
}
