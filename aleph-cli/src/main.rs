//! Aleph CLI - inspect the graph timeline of an RDF store from the terminal
//!
//! Loads sessions, provenance and triples from a SPARQL endpoint, builds the
//! same timeline the daemon serves, and prints states and diffs.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod constants;
mod output;

use aleph_core::TypeDisplayMode;
use commands::state::StateSelector;
use commands::*;
use config::AlephConfig;
use constants::{DEFAULT_DATA_DIR, DEFAULT_SPARQL_HOST, DEFAULT_SPARQL_PORT};
use output::OutputFormat;

/// Graph timeline viewer for session-scoped RDF knowledge graphs.
#[derive(Parser)]
#[command(name = "aleph")]
#[command(author, version)]
#[command(about = "Graph timeline viewer for session-scoped RDF knowledge graphs")]
#[command(propagate_version = true)]
#[command(after_help = "Quick Start:
  aleph sparql        Start a local Oxigraph store
  aleph sample        Insert demo sessions
  aleph timeline      List every graph state

Examples:
  aleph state last            Nodes and links of the newest state
  aleph diff 0 1              What the second interaction added
  aleph --aggregate state 0   Everything in one state")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// SPARQL query endpoint (overrides config)
    #[arg(long, global = true, env = "ALEPH_SPARQL_ENDPOINT")]
    endpoint: Option<String>,

    /// How rdf:type triples are shown: tags, nodes or hidden
    #[arg(long, global = true)]
    type_display: Option<TypeDisplayMode>,

    /// Build one all-inclusive state instead of a timeline
    #[arg(long, global = true)]
    aggregate: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every graph state with its session and interaction
    #[command(visible_alias = "tl")]
    Timeline,

    /// Show the nodes and links of one state
    State {
        /// State index, or "last"
        #[arg(default_value = "last")]
        which: StateSelector,
    },

    /// Show what changed between two states
    Diff {
        /// Earlier state index, or "last"
        from: StateSelector,

        /// Later state index, or "last"
        to: StateSelector,
    },

    /// List the properties of one resource
    Node {
        /// Full resource URI
        uri: String,
    },

    /// Insert demo sessions into the store
    Sample,

    /// Delete every triple in the store
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Start a local SPARQL endpoint using Oxigraph
    Sparql {
        /// Port to bind the server to
        #[arg(short, long, default_value_t = DEFAULT_SPARQL_PORT)]
        port: u16,

        /// Host to bind the server to
        #[arg(long, default_value = DEFAULT_SPARQL_HOST)]
        host: String,

        /// Data directory for Oxigraph storage
        #[arg(short, long, default_value = DEFAULT_DATA_DIR)]
        data_dir: String,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug,hyper=info,reqwest=info"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load configuration from .alephrc.toml
    let config = AlephConfig::load(std::path::Path::new("."));

    // Resolve output format: CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    if let Some(use_color) = config.use_color() {
        colored::control::set_override(use_color);
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    let store = StoreOptions {
        endpoint: cli
            .endpoint
            .unwrap_or_else(|| config.endpoint_url().to_string()),
        timeout: config.timeout(),
        builder: config.builder_config(cli.type_display, cli.aggregate),
    };
    tracing::debug!("Using {:?}", store);

    match command {
        Commands::Timeline => timeline::run(&store, format).await,
        Commands::State { which } => state::run(&store, which, format).await,
        Commands::Diff { from, to } => diff::run(&store, from, to, format).await,
        Commands::Node { uri } => node::run(&store, &uri, format).await,
        Commands::Sample => sample::run(&store, format).await,
        Commands::Reset { yes } => reset::run(&store, yes, format).await,
        Commands::Sparql {
            port,
            host,
            data_dir,
        } => sparql::run(&host, port, &data_dir).await,
    }
}
