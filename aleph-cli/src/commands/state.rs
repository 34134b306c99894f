//! State command - show the nodes and links of one graph state

use aleph_core::{Snapshot, Timeline};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::str::FromStr;
use tabled::{builder::Builder, settings::Style};

use super::{CliError, Loaded, StoreOptions};
use crate::constants::MAX_LABEL_WIDTH;
use crate::output::{truncate, Output, OutputFormat, TableDisplay};

/// Which state to show: an index, or the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSelector {
    Index(usize),
    Last,
}

impl FromStr for StateSelector {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "last" | "live" => Ok(StateSelector::Last),
            other => other
                .parse()
                .map(StateSelector::Index)
                .map_err(|_| CliError::InvalidSelector(s.to_string())),
        }
    }
}

impl StateSelector {
    /// Resolve against a timeline.
    pub fn resolve(self, timeline: &Timeline) -> Result<usize, CliError> {
        let len = timeline.len();
        let index = match self {
            StateSelector::Index(index) => index,
            StateSelector::Last => len.saturating_sub(1),
        };
        if index < len {
            Ok(index)
        } else {
            Err(CliError::StateOutOfRange { index, len })
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StateReport {
    pub index: usize,
    pub of: usize,
    #[serde(flatten)]
    pub state: Snapshot,
}

impl TableDisplay for StateReport {
    fn to_table(&self) -> String {
        let state = &self.state;
        let mut lines = vec![
            format!(
                "{} {} of {}",
                "State".green().bold(),
                self.index + 1,
                self.of
            ),
            format!("  {}: {}", "Session".cyan(), state.session_uri),
            format!("  {}: {}", "Interaction".cyan(), state.interaction_uri),
            format!("  {}: {}", "Time".cyan(), state.timestamp.to_rfc3339()),
            format!("  {}: {}", "Triples".cyan(), state.triple_count),
        ];

        let mut nodes = Builder::default();
        nodes.push_record(["Node", "Label", "Types"]);
        for node in &state.nodes {
            let id = if node.is_type_node {
                format!("{} (type)", node.id)
            } else {
                node.id.clone()
            };
            nodes.push_record([
                id,
                truncate(&node.label, MAX_LABEL_WIDTH),
                node.types.join(", "),
            ]);
        }
        let mut nodes = nodes.build();
        nodes.with(Style::rounded());
        lines.push(nodes.to_string());

        if !state.links.is_empty() {
            let mut links = Builder::default();
            links.push_record(["Source", "Predicate", "Target"]);
            for link in &state.links {
                links.push_record([
                    link.source.clone(),
                    link.predicate.clone(),
                    link.target.clone(),
                ]);
            }
            let mut links = links.build();
            links.with(Style::rounded());
            lines.push(links.to_string());
        }

        lines.join("\n")
    }
}

/// Run the state command
pub async fn run(store: &StoreOptions, selector: StateSelector, format: OutputFormat) -> Result<()> {
    let timeline = match store.load_timeline().await? {
        Loaded::Timeline(timeline) => timeline,
        Loaded::Empty(report) => return Output::new(report, format).render(),
    };

    let index = selector.resolve(&timeline)?;
    let of = timeline.len();
    let state = timeline
        .states
        .into_iter()
        .nth(index)
        .ok_or(CliError::StateOutOfRange { index, len: of })?;

    Output::new(StateReport { index, of, state }, format).render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector() {
        assert_eq!("3".parse::<StateSelector>().unwrap(), StateSelector::Index(3));
        assert_eq!("last".parse::<StateSelector>().unwrap(), StateSelector::Last);
        assert_eq!("LIVE".parse::<StateSelector>().unwrap(), StateSelector::Last);
        assert!("-1".parse::<StateSelector>().is_err());
        assert!("first".parse::<StateSelector>().is_err());
    }
}
