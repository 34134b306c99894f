//! Reset command - delete every triple in the store

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Confirm;
use std::io::{self, IsTerminal};

use super::{create_spinner, StoreOptions};
use crate::output::{Output, OutputFormat, SuccessMessage};

/// Ask before wiping the store. Non-interactive runs need `--yes`.
fn confirm(endpoint: &str) -> bool {
    if !(io::stdin().is_terminal() && io::stdout().is_terminal()) {
        return false;
    }

    println!(
        "{} This deletes every triple in {}.",
        "WARNING:".yellow().bold(),
        endpoint
    );
    Confirm::new()
        .with_prompt("Reset the store?")
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// Run the reset command
pub async fn run(store: &StoreOptions, yes: bool, format: OutputFormat) -> Result<()> {
    if !yes && !confirm(&store.endpoint) {
        anyhow::bail!("Reset not confirmed (pass --yes to skip the prompt)");
    }

    let loader = store.loader()?;
    let spinner = create_spinner("Deleting all triples...");
    let result = loader.reset().await;
    spinner.finish_and_clear();
    result.with_context(|| format!("Failed to reset {}", store.endpoint))?;

    Output::new(
        SuccessMessage::new(format!("Store at {} is now empty", store.endpoint)),
        format,
    )
    .render()
}
