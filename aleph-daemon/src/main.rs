//! Aleph Daemon - live graph timeline server.
//!
//! A single Rust binary that provides:
//! - Timeline of graph states loaded from a SPARQL endpoint
//! - HTTP API for playback, diffs and node details
//! - WebSocket for live updates

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use aleph_core::{BuilderConfig, TypeDisplayMode};
use aleph_daemon::server::{create_router, AppState};
use aleph_daemon::{GraphLoader, ReloadStatus, SparqlClient, Viewer};

/// Aleph graph timeline daemon
#[derive(Parser, Debug)]
#[command(name = "aleph-daemon")]
#[command(about = "Live graph timeline daemon for an RDF knowledge graph")]
#[command(version)]
struct Cli {
    /// SPARQL query endpoint
    #[arg(long, env = "ALEPH_SPARQL_ENDPOINT", default_value = "http://localhost:7878/query")]
    endpoint: String,

    /// HTTP port to listen on
    #[arg(short, long, default_value = "9130")]
    port: u16,

    /// Timeout for each SPARQL request, in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// How rdf:type triples are shown (tags, nodes, hidden)
    #[arg(long, default_value = "tags")]
    type_display: TypeDisplayMode,

    /// Build one all-inclusive state instead of a timeline
    #[arg(long)]
    aggregate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    info!("Starting aleph daemon for {}", cli.endpoint);

    let client = SparqlClient::new(&cli.endpoint, Duration::from_secs(cli.timeout_secs))
        .context("Failed to create SPARQL client")?;
    let loader = GraphLoader::new(Arc::new(client));
    let config = BuilderConfig::new(cli.type_display, cli.aggregate);
    let viewer = Viewer::new(loader, config);

    // Initial load; the daemon still serves if the store is down.
    match viewer.reload().await {
        Ok(ReloadStatus::Applied { states }) => info!("Timeline loaded: {} states", states),
        Ok(ReloadStatus::Empty { reason }) => {
            info!("Store has no timeline yet: {} (POST /sample to add demo data)", reason)
        }
        Ok(ReloadStatus::Superseded) => {}
        Err(e) => warn!("Initial load failed: {}", e),
    }

    let router = create_router(AppState::new(viewer));
    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Aleph daemon listening on http://{}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}
