//! Node command - list the properties of one resource

use aleph_core::{shorten_identifier, Object};
use aleph_daemon::NodeDetails;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use super::{create_spinner, StoreOptions};
use crate::output::{Output, OutputFormat, TableDisplay};

#[derive(Debug, Serialize)]
pub struct NodeReport {
    #[serde(flatten)]
    pub details: NodeDetails,
}

impl TableDisplay for NodeReport {
    fn to_table(&self) -> String {
        let details = &self.details;
        let mut lines = vec![format!(
            "{} {}",
            shorten_identifier(&details.uri).green().bold(),
            details.uri.dimmed()
        )];

        if details.properties.is_empty() {
            lines.push(format!("  {}", "No properties found.".dimmed()));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["Predicate", "Object"]);
            for property in &details.properties {
                let object = match &property.object {
                    Object::Uri(uri) => shorten_identifier(uri).to_string(),
                    Object::Literal(value) => format!("\"{}\"", value),
                };
                builder.push_record([
                    shorten_identifier(&property.predicate).to_string(),
                    object,
                ]);
            }
            let mut table = builder.build();
            table.with(Style::rounded());
            lines.push(table.to_string());
        }

        if details.diagnostics.skipped > 0 {
            lines.push(format!(
                "{} {} malformed row(s) skipped",
                "NOTE:".yellow(),
                details.diagnostics.skipped
            ));
        }

        lines.join("\n")
    }
}

/// Run the node command
pub async fn run(store: &StoreOptions, uri: &str, format: OutputFormat) -> Result<()> {
    let loader = store.loader()?;
    let spinner = create_spinner(&format!("Fetching {}...", uri));
    let details = loader.node_details(uri).await;
    spinner.finish_and_clear();

    let details = details.with_context(|| format!("Failed to fetch properties of {}", uri))?;
    Output::new(NodeReport { details }, format).render()
}
