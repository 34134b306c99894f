//! Build a renderable graph from a set of triples.

use std::borrow::Borrow;
use std::collections::HashMap;

use crate::types::{BuilderConfig, GraphData, Link, Node, Object, ShortId, Triple, TypeDisplayMode};
use crate::uri::{shorten_identifier, TYPE_SHORT};

/// Nodes keyed by id in first-insertion order.
#[derive(Default)]
struct NodeTable {
    nodes: Vec<Node>,
    index: HashMap<ShortId, usize>,
}

impl NodeTable {
    /// Insert a node unless one with the same id exists. The first writer's
    /// attributes are kept.
    fn ensure_with(&mut self, id: &str, make: impl FnOnce() -> Node) {
        if !self.index.contains_key(id) {
            self.index.insert(id.to_string(), self.nodes.len());
            self.nodes.push(make());
        }
    }
}

/// Convert triples into nodes and links.
///
/// Two passes: the first collects type assertions per subject id (in order,
/// duplicates kept), the second emits nodes and links.
///
/// - A type triple always ensures its subject node. With
///   [`TypeDisplayMode::Nodes`] it also ensures a type node for a URI object
///   and emits a `type` link. It never becomes a content link otherwise.
/// - Any other triple ensures its subject node; a URI object also gets a node
///   and a link labelled with the predicate's short form. Literal objects are
///   dropped.
pub fn build_snapshot<T: Borrow<Triple>>(triples: &[T], config: &BuilderConfig) -> GraphData {
    let mut node_types: HashMap<&str, Vec<&str>> = HashMap::new();
    for triple in triples {
        let triple = triple.borrow();
        if shorten_identifier(&triple.predicate) == TYPE_SHORT {
            node_types
                .entry(shorten_identifier(&triple.subject))
                .or_default()
                .push(shorten_identifier(triple.object.value()));
        }
    }

    let types_for = |id: &str| -> Vec<ShortId> {
        match config.type_display {
            TypeDisplayMode::Tags => node_types
                .get(id)
                .map(|types| types.iter().map(|t| t.to_string()).collect())
                .unwrap_or_default(),
            TypeDisplayMode::Nodes | TypeDisplayMode::Hidden => Vec::new(),
        }
    };

    let mut table = NodeTable::default();
    let mut links = Vec::new();

    for triple in triples {
        let triple = triple.borrow();
        let subject = shorten_identifier(&triple.subject);
        let predicate = shorten_identifier(&triple.predicate);

        table.ensure_with(subject, || Node::new(subject, types_for(subject)));

        if predicate == TYPE_SHORT {
            if config.type_display == TypeDisplayMode::Nodes {
                if let Object::Uri(object) = &triple.object {
                    let object = shorten_identifier(object);
                    table.ensure_with(object, || Node::type_node(object));
                    links.push(Link::new(subject, object, predicate));
                }
            }
            continue;
        }

        if let Object::Uri(object) = &triple.object {
            let object = shorten_identifier(object);
            table.ensure_with(object, || Node::new(object, types_for(object)));
            links.push(Link::new(subject, object, predicate));
        }
    }

    GraphData {
        nodes: table.nodes,
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uri::RDF_TYPE;

    const EX: &str = "http://example.org/";

    fn ex(local: &str) -> String {
        format!("{}{}", EX, local)
    }

    fn config(mode: TypeDisplayMode) -> BuilderConfig {
        BuilderConfig::new(mode, false)
    }

    #[test]
    fn test_type_triple_as_tags() {
        let triples = vec![Triple::uri(ex("a"), RDF_TYPE, ex("Dog"))];
        let graph = build_snapshot(&triples, &config(TypeDisplayMode::Tags));

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].id, "a");
        assert_eq!(graph.nodes[0].types, vec!["Dog"]);
        assert!(!graph.nodes[0].is_type_node);
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_type_triple_as_nodes() {
        let triples = vec![Triple::uri(ex("a"), RDF_TYPE, ex("Dog"))];
        let graph = build_snapshot(&triples, &config(TypeDisplayMode::Nodes));

        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "Dog"]);
        assert!(graph.nodes[0].types.is_empty());
        assert!(graph.nodes[1].is_type_node);
        assert_eq!(graph.links, vec![Link::new("a", "Dog", "type")]);
    }

    #[test]
    fn test_type_triple_hidden() {
        let triples = vec![Triple::uri(ex("a"), RDF_TYPE, ex("Dog"))];
        let graph = build_snapshot(&triples, &config(TypeDisplayMode::Hidden));

        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.nodes[0].types.is_empty());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_literal_object_dropped() {
        let triples = vec![Triple::literal(ex("a"), ex("name"), "Alice")];
        let graph = build_snapshot(&triples, &config(TypeDisplayMode::Tags));

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].id, "a");
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_uri_object_creates_node_and_link() {
        let triples = vec![
            Triple::uri(ex("a"), ex("knows"), ex("b")),
            Triple::uri(ex("b"), RDF_TYPE, ex("Person")),
        ];
        let graph = build_snapshot(&triples, &config(TypeDisplayMode::Tags));

        assert_eq!(graph.nodes.len(), 2);
        // b's types come from the first pass even though it is seen as an
        // object before its type triple.
        assert_eq!(graph.nodes[1].types, vec!["Person"]);
        assert_eq!(graph.links, vec![Link::new("a", "b", "knows")]);
    }

    #[test]
    fn test_duplicate_types_kept_in_order() {
        let triples = vec![
            Triple::uri(ex("a"), RDF_TYPE, ex("Dog")),
            Triple::uri(ex("a"), RDF_TYPE, ex("Pet")),
            Triple::uri(ex("a"), RDF_TYPE, ex("Dog")),
        ];
        let graph = build_snapshot(&triples, &config(TypeDisplayMode::Tags));
        assert_eq!(graph.nodes[0].types, vec!["Dog", "Pet", "Dog"]);
    }

    #[test]
    fn test_nodes_are_idempotent() {
        let triples = vec![
            Triple::uri(ex("a"), ex("knows"), ex("b")),
            Triple::uri(ex("b"), ex("knows"), ex("a")),
            Triple::uri(ex("a"), ex("knows"), ex("b")),
        ];
        let graph = build_snapshot(&triples, &config(TypeDisplayMode::Tags));
        assert_eq!(graph.nodes.len(), 2);
        // Links are emitted per triple; collapsing happens on diff keys.
        assert_eq!(graph.links.len(), 3);
    }

    #[test]
    fn test_first_writer_wins() {
        // Dog is first materialized as a type node, then appears as a subject.
        let triples = vec![
            Triple::uri(ex("a"), RDF_TYPE, ex("Dog")),
            Triple::uri(ex("Dog"), ex("subClassOf"), ex("Animal")),
        ];
        let graph = build_snapshot(&triples, &config(TypeDisplayMode::Nodes));
        let dog = graph.nodes.iter().find(|n| n.id == "Dog").unwrap();
        assert!(dog.is_type_node);
    }

    #[test]
    fn test_short_id_collision_is_one_node() {
        let triples = vec![
            Triple::uri("http://one.org/x", ex("rel"), ex("y")),
            Triple::uri("http://two.org/x", ex("rel"), ex("z")),
        ];
        let graph = build_snapshot(&triples, &config(TypeDisplayMode::Tags));
        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_literal_type_object_not_materialized() {
        let triples = vec![Triple::literal(ex("a"), RDF_TYPE, "Dog")];
        let graph = build_snapshot(&triples, &config(TypeDisplayMode::Nodes));
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_accepts_borrowed_triples() {
        let triples = vec![Triple::uri(ex("a"), ex("knows"), ex("b"))];
        let borrowed: Vec<&Triple> = triples.iter().collect();
        let graph = build_snapshot(&borrowed, &config(TypeDisplayMode::Tags));
        assert_eq!(graph.nodes.len(), 2);
    }
}
