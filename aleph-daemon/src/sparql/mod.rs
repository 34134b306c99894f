//! SPARQL 1.1 protocol access to the upstream triple store.
//!
//! [`QueryEngine`] is the seam between the loader and the store:
//! [`SparqlClient`] talks HTTP, tests plug in an in-memory fake.

mod client;
pub mod queries;

use aleph_core::SparqlResults;
use async_trait::async_trait;
use thiserror::Error;

pub use client::{update_endpoint_for, SparqlClient};

/// Failure talking to the store.
#[derive(Error, Debug)]
pub enum SparqlError {
    /// Connection refused, DNS failure and similar.
    #[error("cannot reach SPARQL endpoint {endpoint}: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("SPARQL endpoint {endpoint} timed out")]
    Timeout { endpoint: String },

    /// The endpoint answered with a non-success status.
    #[error("SPARQL endpoint {endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body is not SPARQL JSON results.
    #[error("invalid SPARQL results from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

/// Executes SPARQL queries and updates.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Run a SELECT query and return its bindings.
    async fn select(&self, query: &str) -> Result<SparqlResults, SparqlError>;

    /// Run an update (INSERT DATA, DELETE WHERE, ...).
    async fn update(&self, update: &str) -> Result<(), SparqlError>;

    /// Endpoint description for logs and status output.
    fn endpoint(&self) -> &str;
}
