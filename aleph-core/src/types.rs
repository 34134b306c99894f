//! Data types shared across the builder, differ and playback modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Display id derived from a URI by [`crate::uri::shorten_identifier`].
pub type ShortId = String;

/// Object position of a triple.
///
/// Only [`Object::Uri`] objects become nodes and link targets; literals are
/// dropped from the rendered graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Object {
    Uri(String),
    Literal(String),
}

impl Object {
    /// Raw lexical value.
    pub fn value(&self) -> &str {
        match self {
            Object::Uri(v) | Object::Literal(v) => v,
        }
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, Object::Uri(_))
    }

    /// Type tag as used in SPARQL JSON results.
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Uri(_) => "uri",
            Object::Literal(_) => "literal",
        }
    }
}

/// An RDF statement as read from the triple store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Object,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Object) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }

    /// Triple with a URI object.
    pub fn uri(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self::new(subject, predicate, Object::Uri(object.into()))
    }

    /// Triple with a literal object.
    pub fn literal(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self::new(subject, predicate, Object::Literal(object.into()))
    }
}

/// A point-in-time unit of work inside a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub uri: String,
    pub start_time: DateTime<Utc>,
    pub session_uri: String,
}

/// One usage episode, holding its interactions in start-time order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uri: String,
    pub start_time: DateTime<Utc>,
    pub interactions: Vec<Interaction>,
}

impl Session {
    /// Earliest interaction, if the session has any.
    pub fn first_interaction(&self) -> Option<&Interaction> {
        self.interactions.first()
    }
}

/// A rendered entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: ShortId,
    pub label: String,
    pub types: Vec<ShortId>,
    pub is_type_node: bool,
}

impl Node {
    pub fn new(id: &str, types: Vec<ShortId>) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            types,
            is_type_node: false,
        }
    }

    /// A node materialized from the object of a type assertion.
    pub fn type_node(id: &str) -> Self {
        Self {
            is_type_node: true,
            ..Self::new(id, Vec::new())
        }
    }
}

/// A rendered relationship.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source: ShortId,
    pub target: ShortId,
    pub predicate: ShortId,
}

impl Link {
    pub fn new(source: &str, target: &str, predicate: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            predicate: predicate.to_string(),
        }
    }

    /// Identity key used when diffing snapshots.
    pub fn key(&self) -> String {
        format!("{}-{}-{}", self.source, self.target, self.predicate)
    }
}

/// Nodes and links of one graph, in insertion/emission order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

/// Position of a snapshot on the timeline and what it was built from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub session_index: usize,
    pub interaction_index: usize,
    pub session_uri: String,
    pub interaction_uri: String,
    pub timestamp: DateTime<Utc>,
    pub triple_count: usize,
}

/// An immutable graph state on the timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub session_index: usize,
    pub interaction_index: usize,
    pub session_uri: String,
    pub interaction_uri: String,
    pub timestamp: DateTime<Utc>,
    pub triple_count: usize,
}

impl Snapshot {
    pub fn from_graph(graph: GraphData, meta: SnapshotMeta) -> Self {
        Self {
            nodes: graph.nodes,
            links: graph.links,
            session_index: meta.session_index,
            interaction_index: meta.interaction_index,
            session_uri: meta.session_uri,
            interaction_uri: meta.interaction_uri,
            timestamp: meta.timestamp,
            triple_count: meta.triple_count,
        }
    }

    /// Set of node ids in this snapshot.
    pub fn node_ids(&self) -> BTreeSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Set of link identity keys in this snapshot.
    pub fn link_ids(&self) -> BTreeSet<String> {
        self.links.iter().map(Link::key).collect()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

/// How `rdf:type` triples are represented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDisplayMode {
    /// Attach the type list to the subject node.
    #[default]
    Tags,
    /// Materialize each type as its own node with a `type` link.
    Nodes,
    /// Drop type information from node metadata.
    Hidden,
}

impl TypeDisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeDisplayMode::Tags => "tags",
            TypeDisplayMode::Nodes => "nodes",
            TypeDisplayMode::Hidden => "hidden",
        }
    }
}

impl fmt::Display for TypeDisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeDisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tags" | "on" => Ok(TypeDisplayMode::Tags),
            "nodes" => Ok(TypeDisplayMode::Nodes),
            "hidden" | "off" => Ok(TypeDisplayMode::Hidden),
            _ => Err(format!(
                "Unknown type display mode: '{}' (expected tags, nodes or hidden)",
                s
            )),
        }
    }
}

/// Options recognized by the graph state builder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    #[serde(default)]
    pub type_display: TypeDisplayMode,
    /// Skip temporal partitioning and emit one all-inclusive snapshot.
    #[serde(default)]
    pub aggregate: bool,
}

impl BuilderConfig {
    pub fn new(type_display: TypeDisplayMode, aggregate: bool) -> Self {
        Self {
            type_display,
            aggregate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_kind() {
        assert_eq!(Object::Uri("x".into()).kind(), "uri");
        assert_eq!(Object::Literal("x".into()).kind(), "literal");
        assert!(Object::Uri("x".into()).is_uri());
        assert!(!Object::Literal("x".into()).is_uri());
    }

    #[test]
    fn test_object_serializes_tagged() {
        let json = serde_json::to_value(Object::Literal("Alice".into())).unwrap();
        assert_eq!(json["kind"], "literal");
        assert_eq!(json["value"], "Alice");
    }

    #[test]
    fn test_link_key() {
        let link = Link::new("a", "b", "knows");
        assert_eq!(link.key(), "a-b-knows");
    }

    #[test]
    fn test_type_display_from_str() {
        assert_eq!("tags".parse(), Ok(TypeDisplayMode::Tags));
        assert_eq!("on".parse(), Ok(TypeDisplayMode::Tags));
        assert_eq!("NODES".parse(), Ok(TypeDisplayMode::Nodes));
        assert_eq!("off".parse(), Ok(TypeDisplayMode::Hidden));
        assert!("sideways".parse::<TypeDisplayMode>().is_err());
    }

    #[test]
    fn test_type_display_serde_names() {
        let json = serde_json::to_string(&TypeDisplayMode::Hidden).unwrap();
        assert_eq!(json, "\"hidden\"");
        let config: BuilderConfig = serde_json::from_str(r#"{"type_display":"nodes"}"#).unwrap();
        assert_eq!(config.type_display, TypeDisplayMode::Nodes);
        assert!(!config.aggregate);
    }

    #[test]
    fn test_type_node_flag() {
        let node = Node::type_node("Dog");
        assert!(node.is_type_node);
        assert!(node.types.is_empty());
        assert_eq!(node.label, "Dog");
    }
}
