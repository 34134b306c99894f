//! Position arena carrying node coordinates across graph states by id.
//!
//! A renderer reports positions back with [`PositionArena::update`]; on the
//! next state change [`PositionArena::carry_forward`] pins every node that
//! was already on screen and seeds new nodes at their session's cluster
//! centre.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{Node, ShortId, Snapshot};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Fixed in place; the force layout will not move it.
    pub pinned: bool,
}

impl NodePosition {
    fn at(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            ..Default::default()
        }
    }
}

/// A node of the current state with its carried-forward position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedNode {
    #[serde(flatten)]
    pub node: Node,
    pub position: NodePosition,
    /// Not present in the previous render.
    pub is_new: bool,
    pub session_index: Option<usize>,
}

/// Cluster centres for `session_count` sessions, spaced evenly along the
/// horizontal midline.
pub fn session_centers(width: f64, height: f64, session_count: usize) -> Vec<Point> {
    let spacing = width / (session_count as f64 + 1.0);
    (0..session_count)
        .map(|i| Point {
            x: spacing * (i as f64 + 1.0),
            y: height / 2.0,
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct PositionArena {
    width: f64,
    height: f64,
    positions: HashMap<ShortId, NodePosition>,
}

impl PositionArena {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            positions: HashMap::new(),
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }

    /// Merge a new state into the arena.
    ///
    /// Known nodes keep their coordinates, lose their velocity and are
    /// pinned. New nodes start unpinned at their session centre, or at the
    /// canvas centre when they have no session. Nodes missing from the state
    /// are forgotten.
    pub fn carry_forward(
        &mut self,
        snapshot: &Snapshot,
        node_sessions: &BTreeMap<ShortId, usize>,
        session_count: usize,
    ) -> Vec<PlacedNode> {
        let centers = session_centers(self.width, self.height, session_count);
        let fallback = self.center();

        let mut next = HashMap::with_capacity(snapshot.nodes.len());
        let mut placed = Vec::with_capacity(snapshot.nodes.len());

        for node in &snapshot.nodes {
            let session_index = node_sessions.get(&node.id).copied();
            let (position, is_new) = match self.positions.get(&node.id) {
                Some(previous) => (
                    NodePosition {
                        x: previous.x,
                        y: previous.y,
                        vx: 0.0,
                        vy: 0.0,
                        pinned: true,
                    },
                    false,
                ),
                None => {
                    let seed = session_index
                        .and_then(|idx| centers.get(idx).copied())
                        .unwrap_or(fallback);
                    (NodePosition::at(seed), true)
                }
            };

            next.insert(node.id.clone(), position);
            placed.push(PlacedNode {
                node: node.clone(),
                position,
                is_new,
                session_index,
            });
        }

        self.positions = next;
        placed
    }

    /// Record a position reported by the renderer. Unknown ids are ignored.
    pub fn update(&mut self, id: &str, x: f64, y: f64, vx: f64, vy: f64) -> bool {
        match self.positions.get_mut(id) {
            Some(position) => {
                position.x = x;
                position.y = y;
                position.vx = vx;
                position.vy = vy;
                true
            }
            None => false,
        }
    }

    /// Release a pinned node back to the force layout.
    pub fn unpin(&mut self, id: &str) -> bool {
        match self.positions.get_mut(id) {
            Some(position) => {
                position.pinned = false;
                true
            }
            None => false,
        }
    }

    pub fn position(&self, id: &str) -> Option<&NodePosition> {
        self.positions.get(id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GraphData, SnapshotMeta};
    use chrono::Utc;

    fn snapshot(ids: &[&str]) -> Snapshot {
        let graph = GraphData {
            nodes: ids.iter().map(|id| Node::new(id, Vec::new())).collect(),
            links: Vec::new(),
        };
        Snapshot::from_graph(
            graph,
            SnapshotMeta {
                session_index: 0,
                interaction_index: 0,
                session_uri: "s".into(),
                interaction_uri: "i".into(),
                timestamp: Utc::now(),
                triple_count: 0,
            },
        )
    }

    #[test]
    fn test_session_centers() {
        let centers = session_centers(900.0, 600.0, 2);
        assert_eq!(centers, vec![Point { x: 300.0, y: 300.0 }, Point { x: 600.0, y: 300.0 }]);
        assert!(session_centers(900.0, 600.0, 0).is_empty());
    }

    #[test]
    fn test_new_nodes_seeded_at_cluster() {
        let mut arena = PositionArena::new(900.0, 600.0);
        let sessions: BTreeMap<ShortId, usize> = [("a".to_string(), 1)].into_iter().collect();

        let placed = arena.carry_forward(&snapshot(&["a", "b"]), &sessions, 2);
        assert!(placed.iter().all(|p| p.is_new && !p.position.pinned));
        assert_eq!((placed[0].position.x, placed[0].position.y), (600.0, 300.0));
        // No session: canvas centre.
        assert_eq!((placed[1].position.x, placed[1].position.y), (450.0, 300.0));
        assert_eq!(placed[1].session_index, None);
    }

    #[test]
    fn test_known_nodes_keep_position_and_pin() {
        let mut arena = PositionArena::new(900.0, 600.0);
        let sessions = BTreeMap::new();

        arena.carry_forward(&snapshot(&["a"]), &sessions, 0);
        assert!(arena.update("a", 10.0, 20.0, 3.0, -1.0));

        let placed = arena.carry_forward(&snapshot(&["a", "b"]), &sessions, 0);
        let a = &placed[0];
        assert!(!a.is_new);
        assert_eq!(
            a.position,
            NodePosition {
                x: 10.0,
                y: 20.0,
                vx: 0.0,
                vy: 0.0,
                pinned: true
            }
        );
        assert!(placed[1].is_new);
    }

    #[test]
    fn test_removed_nodes_forgotten() {
        let mut arena = PositionArena::new(100.0, 100.0);
        let sessions = BTreeMap::new();
        arena.carry_forward(&snapshot(&["a", "b"]), &sessions, 0);
        arena.carry_forward(&snapshot(&["b"]), &sessions, 0);

        assert_eq!(arena.len(), 1);
        assert!(arena.position("a").is_none());
        assert!(!arena.update("a", 1.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn test_unpin() {
        let mut arena = PositionArena::new(100.0, 100.0);
        let sessions = BTreeMap::new();
        arena.carry_forward(&snapshot(&["a"]), &sessions, 0);
        arena.carry_forward(&snapshot(&["a"]), &sessions, 0);
        assert!(arena.position("a").unwrap().pinned);

        assert!(arena.unpin("a"));
        assert!(!arena.position("a").unwrap().pinned);
        assert!(!arena.unpin("zzz"));

        arena.clear();
        assert!(arena.is_empty());
    }
}
