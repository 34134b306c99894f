//! Command implementations for the Aleph CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod diff;
pub mod node;
pub mod reset;
pub mod sample;
pub mod sparql;
pub mod state;
pub mod timeline;

use std::sync::Arc;
use std::time::Duration;

use aleph_core::{BuildOutcome, BuilderConfig, EmptyReason, RowDiagnostics, Timeline};
use aleph_daemon::{GraphLoader, SparqlClient};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use thiserror::Error;

use crate::constants::SPINNER_TICK_MS;
use crate::output::{is_tty, TableDisplay};

/// Errors reported by commands, on top of upstream failures.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("State {index} does not exist (timeline has {len} states)")]
    StateOutOfRange { index: usize, len: usize },

    #[error("Invalid state selector '{0}' (expected an index or 'last')")]
    InvalidSelector(String),
}

/// Where to load from and how to build.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub endpoint: String,
    pub timeout: Duration,
    pub builder: BuilderConfig,
}

impl StoreOptions {
    pub fn loader(&self) -> Result<GraphLoader> {
        let client = SparqlClient::new(&self.endpoint, self.timeout)
            .with_context(|| format!("Failed to create SPARQL client for {}", self.endpoint))?;
        Ok(GraphLoader::new(Arc::new(client)))
    }

    /// Load and build, with a spinner on interactive terminals.
    pub async fn load(&self) -> Result<BuildOutcome> {
        let loader = self.loader()?;
        let spinner = create_spinner(&format!("Loading graph from {}...", self.endpoint));
        let outcome = loader.load(&self.builder).await;
        spinner.finish_and_clear();
        outcome.with_context(|| format!("Failed to load timeline from {}", self.endpoint))
    }

    /// Like [`StoreOptions::load`], with the empty outcome turned into a report.
    pub async fn load_timeline(&self) -> Result<Loaded> {
        Ok(match self.load().await? {
            BuildOutcome::Ready(timeline) => Loaded::Timeline(timeline),
            BuildOutcome::Empty {
                reason,
                diagnostics,
            } => Loaded::Empty(EmptyReport::new(&self.endpoint, reason, diagnostics)),
        })
    }
}

/// Create a spinner for progress display. Hidden when stdout is piped.
pub fn create_spinner(message: &str) -> ProgressBar {
    if !is_tty() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    spinner
}

/// Reported instead of a timeline when the store has nothing to show.
#[derive(Debug, Serialize)]
pub struct EmptyReport {
    pub endpoint: String,
    pub reason: EmptyReason,
    pub diagnostics: RowDiagnostics,
    pub hint: String,
}

impl EmptyReport {
    pub fn new(endpoint: &str, reason: EmptyReason, diagnostics: RowDiagnostics) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            reason,
            diagnostics,
            hint: "Run `aleph sample` to insert demo data".to_string(),
        }
    }
}

impl TableDisplay for EmptyReport {
    fn to_table(&self) -> String {
        let mut lines = vec![
            format!("{} {}", "EMPTY:".yellow().bold(), self.reason),
            format!("  {}: {}", "Endpoint".cyan(), self.endpoint),
        ];
        if self.diagnostics.skipped > 0 {
            lines.push(format!(
                "  {}: {}",
                "Skipped rows".cyan(),
                self.diagnostics.skipped
            ));
        }
        lines.push(String::new());
        lines.push(format!("{}: {}", "Next action".yellow(), self.hint));
        lines.join("\n")
    }
}

/// Either a timeline to report on, or the empty report already built.
pub enum Loaded {
    Timeline(Timeline),
    Empty(EmptyReport),
}
