//! Diff command - what entered and left the graph between two states

use aleph_core::{diff_snapshots, DiffSummary, SnapshotDiff};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::state::StateSelector;
use super::{Loaded, StoreOptions};
use crate::output::{Output, OutputFormat, TableDisplay};

#[derive(Debug, Serialize)]
pub struct DiffReport {
    pub from: usize,
    pub to: usize,
    pub summary: DiffSummary,
    #[serde(flatten)]
    pub diff: SnapshotDiff,
}

impl TableDisplay for DiffReport {
    fn to_table(&self) -> String {
        let mut lines = vec![format!(
            "{} state {} -> state {}",
            "Diff:".green().bold(),
            self.from,
            self.to
        )];

        if self.diff.is_empty() {
            lines.push(format!("  {}", "No changes".dimmed()));
            return lines.join("\n");
        }

        for id in &self.diff.new_node_ids {
            lines.push(format!("  {} {}", "+".green(), id));
        }
        for id in &self.diff.removed_node_ids {
            lines.push(format!("  {} {}", "-".red(), id));
        }
        for key in &self.diff.new_link_ids {
            lines.push(format!("  {} {}", "+".green(), key.dimmed()));
        }
        for key in &self.diff.removed_link_ids {
            lines.push(format!("  {} {}", "-".red(), key.dimmed()));
        }

        lines.push(String::new());
        lines.push(self.summary.text());
        lines.join("\n")
    }
}

/// Run the diff command
pub async fn run(
    store: &StoreOptions,
    from: StateSelector,
    to: StateSelector,
    format: OutputFormat,
) -> Result<()> {
    let timeline = match store.load_timeline().await? {
        Loaded::Timeline(timeline) => timeline,
        Loaded::Empty(report) => return Output::new(report, format).render(),
    };

    let from = from.resolve(&timeline)?;
    let to = to.resolve(&timeline)?;
    let diff = diff_snapshots(timeline.state(from), &timeline.states[to]);

    Output::new(
        DiffReport {
            from,
            to,
            summary: diff.summary(),
            diff,
        },
        format,
    )
    .render()
}
