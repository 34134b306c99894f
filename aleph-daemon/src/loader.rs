//! Fetch sessions, provenance and triples from the store and build the
//! timeline.

use std::sync::Arc;
use std::time::Instant;

use aleph_core::rows::Row;
use aleph_core::{
    decode_object, decode_result_rows, decode_session_rows, decode_triples, BuildOutcome,
    BuilderConfig, Dataset, GraphStateBuilder, Object, RowDiagnostics,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::sparql::queries::{
    node_details_query, DELETE_ALL_UPDATE, INTERACTION_RESULTS_QUERY, SAMPLE_DATA_UPDATE,
    SESSIONS_QUERY, TRIPLES_QUERY,
};
use crate::sparql::{QueryEngine, SparqlError};

/// Errors raised by a load.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The store could not be queried. Nothing from this load is applied.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] SparqlError),

    #[error("invalid resource URI: {0}")]
    InvalidUri(String),
}

/// One `(predicate, object)` pair of a resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProperty {
    pub predicate: String,
    pub object: Object,
}

/// Properties of a resource, with rows that could not be read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDetails {
    pub uri: String,
    pub properties: Vec<NodeProperty>,
    pub diagnostics: RowDiagnostics,
}

/// Turns store contents into a [`BuildOutcome`].
#[derive(Clone)]
pub struct GraphLoader {
    engine: Arc<dyn QueryEngine>,
}

impl GraphLoader {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self { engine }
    }

    pub fn endpoint(&self) -> &str {
        self.engine.endpoint()
    }

    /// Run the three load queries and build the timeline.
    ///
    /// Any upstream failure fails the whole load; malformed rows are skipped
    /// and reported in the outcome's diagnostics.
    pub async fn load(&self, config: &BuilderConfig) -> Result<BuildOutcome, LoadError> {
        let start = Instant::now();
        info!("Loading graph from {}", self.engine.endpoint());

        let (sessions, results, triples) = tokio::try_join!(
            self.engine.select(SESSIONS_QUERY),
            self.engine.select(INTERACTION_RESULTS_QUERY),
            self.engine.select(TRIPLES_QUERY),
        )?;

        debug!(
            "Fetched {} session rows, {} result rows, {} triples",
            sessions.rows().len(),
            results.rows().len(),
            triples.rows().len()
        );

        let dataset = Dataset::from_decoded(
            decode_triples(triples.rows()),
            decode_session_rows(sessions.rows()),
            decode_result_rows(results.rows()),
        );
        if !dataset.diagnostics.is_clean() {
            info!("Skipped {} malformed rows", dataset.diagnostics.skipped);
        }

        let outcome = GraphStateBuilder::new(*config).build(&dataset);
        info!("Load finished in {:?}", start.elapsed());
        Ok(outcome)
    }

    /// All properties of one resource.
    pub async fn node_details(&self, uri: &str) -> Result<NodeDetails, LoadError> {
        let query = node_details_query(uri).ok_or_else(|| LoadError::InvalidUri(uri.to_string()))?;
        let results = self.engine.select(&query).await?;

        let mut details = NodeDetails {
            uri: uri.to_string(),
            ..Default::default()
        };
        for (index, row) in results.rows().iter().enumerate() {
            match decode_property(index, row) {
                Ok(property) => details.properties.push(property),
                Err(err) => details.diagnostics.record("property", err),
            }
        }
        Ok(details)
    }

    /// Insert the demo sessions.
    pub async fn load_sample_data(&self) -> Result<(), LoadError> {
        info!("Loading sample data into {}", self.engine.endpoint());
        self.engine.update(SAMPLE_DATA_UPDATE).await?;
        Ok(())
    }

    /// Delete every triple in the store.
    pub async fn reset(&self) -> Result<(), LoadError> {
        info!("Deleting all triples from {}", self.engine.endpoint());
        self.engine.update(DELETE_ALL_UPDATE).await?;
        Ok(())
    }
}

fn decode_property(index: usize, row: &Row) -> Result<NodeProperty, aleph_core::RowError> {
    let missing = |field: &str| aleph_core::RowError::MissingField {
        row: index,
        field: field.to_string(),
    };

    let predicate = row
        .get("p")
        .and_then(|t| t.value.clone())
        .ok_or_else(|| missing("p"))?;
    let term = row.get("o").ok_or_else(|| missing("o"))?;
    let object = decode_object(index, "o", term)?;

    Ok(NodeProperty { predicate, object })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleph_core::Term;

    #[test]
    fn test_decode_property() {
        let row: Row = [
            ("p".to_string(), Term::uri("http://www.w3.org/2000/01/rdf-schema#label")),
            ("o".to_string(), Term::literal("RDF")),
        ]
        .into_iter()
        .collect();
        let property = decode_property(0, &row).unwrap();
        assert_eq!(property.object, Object::Literal("RDF".to_string()));
    }

    #[test]
    fn test_decode_property_rejects_blank_node() {
        let row: Row = [
            ("p".to_string(), Term::uri("http://x/p")),
            (
                "o".to_string(),
                Term {
                    kind: Some("bnode".to_string()),
                    value: Some("b0".to_string()),
                    ..Default::default()
                },
            ),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            decode_property(0, &row),
            Err(aleph_core::RowError::UnsupportedTermType { .. })
        ));
    }

    #[test]
    fn test_decode_property_missing_object() {
        let row: Row = [("p".to_string(), Term::uri("http://x/p"))].into_iter().collect();
        assert!(decode_property(0, &row).is_err());
    }
}
