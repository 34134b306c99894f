//! Timeline command - list every graph state with its provenance

use aleph_core::shorten_identifier;
use aleph_daemon::TimelineSummary;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use super::{Loaded, StoreOptions};
use crate::output::{Output, OutputFormat, TableDisplay};

#[derive(Debug, Serialize)]
pub struct TimelineReport {
    pub endpoint: String,
    #[serde(flatten)]
    pub summary: TimelineSummary,
}

impl TableDisplay for TimelineReport {
    fn to_table(&self) -> String {
        let summary = &self.summary;
        let mut builder = Builder::default();
        builder.push_record(["#", "Session", "Interaction", "Time", "Triples", "Nodes", "Links"]);

        for state in &summary.states {
            builder.push_record([
                state.index.to_string(),
                shorten_identifier(&state.session_uri).to_string(),
                shorten_identifier(&state.interaction_uri).to_string(),
                state.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                state.triple_count.to_string(),
                state.node_count.to_string(),
                state.link_count.to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());

        let mut lines = vec![
            format!(
                "{} {} states over {} sessions ({} interactions, {})",
                "Timeline:".green().bold(),
                summary.states.len(),
                summary.sessions,
                summary.interactions,
                summary.mode
            ),
            format!("  {}: {}", "Endpoint".cyan(), self.endpoint),
            table.to_string(),
        ];

        if summary.unresolved_triples > 0 {
            lines.push(format!(
                "{} {} triple(s) not attributed to any interaction",
                "NOTE:".yellow(),
                summary.unresolved_triples
            ));
        }
        if summary.skipped_rows > 0 {
            lines.push(format!(
                "{} {} malformed row(s) skipped",
                "NOTE:".yellow(),
                summary.skipped_rows
            ));
        }

        lines.join("\n")
    }
}

/// Run the timeline command
pub async fn run(store: &StoreOptions, format: OutputFormat) -> Result<()> {
    match store.load_timeline().await? {
        Loaded::Timeline(timeline) => Output::new(
            TimelineReport {
                endpoint: store.endpoint.clone(),
                summary: TimelineSummary::new(&timeline),
            },
            format,
        )
        .render(),
        Loaded::Empty(report) => Output::new(report, format).render(),
    }
}
