//! Node and link set differences between two graph states.
//!
//! Identity is the node's short id and the link's
//! `source-target-predicate` key, so links repeated within one state collapse
//! here.

use serde::{Deserialize, Serialize};

use crate::types::Snapshot;

/// Ids that appear or disappear between two states, sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    pub new_node_ids: Vec<String>,
    pub removed_node_ids: Vec<String>,
    pub new_link_ids: Vec<String>,
    pub removed_link_ids: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.new_node_ids.is_empty()
            && self.removed_node_ids.is_empty()
            && self.new_link_ids.is_empty()
            && self.removed_link_ids.is_empty()
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            nodes_added: self.new_node_ids.len(),
            nodes_removed: self.removed_node_ids.len(),
            links_added: self.new_link_ids.len(),
            links_removed: self.removed_link_ids.len(),
        }
    }

    pub fn summary_text(&self) -> String {
        self.summary().text()
    }
}

/// Change counts for a [`SnapshotDiff`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub nodes_added: usize,
    pub nodes_removed: usize,
    pub links_added: usize,
    pub links_removed: usize,
}

impl DiffSummary {
    /// Generate human-readable summary string.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();

        if self.nodes_added > 0 || self.nodes_removed > 0 {
            let mut node_parts = Vec::new();
            if self.nodes_added > 0 {
                node_parts.push(format!("{} added", self.nodes_added));
            }
            if self.nodes_removed > 0 {
                node_parts.push(format!("{} removed", self.nodes_removed));
            }
            parts.push(format!("nodes: {}", node_parts.join(", ")));
        }

        if self.links_added > 0 || self.links_removed > 0 {
            let mut link_parts = Vec::new();
            if self.links_added > 0 {
                link_parts.push(format!("{} added", self.links_added));
            }
            if self.links_removed > 0 {
                link_parts.push(format!("{} removed", self.links_removed));
            }
            parts.push(format!("links: {}", link_parts.join(", ")));
        }

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Diff `next` against `previous`. With no previous state, everything in
/// `next` is new.
pub fn diff_snapshots(previous: Option<&Snapshot>, next: &Snapshot) -> SnapshotDiff {
    let next_nodes = next.node_ids();
    let next_links = next.link_ids();

    let Some(previous) = previous else {
        return SnapshotDiff {
            new_node_ids: next_nodes.into_iter().map(str::to_string).collect(),
            removed_node_ids: Vec::new(),
            new_link_ids: next_links.into_iter().collect(),
            removed_link_ids: Vec::new(),
        };
    };

    let prev_nodes = previous.node_ids();
    let prev_links = previous.link_ids();

    SnapshotDiff {
        new_node_ids: next_nodes
            .difference(&prev_nodes)
            .map(|id| id.to_string())
            .collect(),
        removed_node_ids: prev_nodes
            .difference(&next_nodes)
            .map(|id| id.to_string())
            .collect(),
        new_link_ids: next_links.difference(&prev_links).cloned().collect(),
        removed_link_ids: prev_links.difference(&next_links).cloned().collect(),
    }
}
