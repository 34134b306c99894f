//! reqwest-backed SPARQL protocol client.

use std::time::Duration;

use aleph_core::SparqlResults;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use super::{QueryEngine, SparqlError};

const SPARQL_QUERY: &str = "application/sparql-query";
const SPARQL_UPDATE: &str = "application/sparql-update";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Derive the update endpoint from a query endpoint by swapping its `/query`
/// segment for `/update`. Endpoints without one are used as-is.
pub fn update_endpoint_for(query_endpoint: &str) -> String {
    match query_endpoint.strip_suffix("/query") {
        Some(base) => format!("{}/update", base),
        None => query_endpoint.replacen("/query", "/update", 1),
    }
}

/// Client for a SPARQL 1.1 endpoint pair (query + update).
#[derive(Clone, Debug)]
pub struct SparqlClient {
    client: reqwest::Client,
    query_endpoint: String,
    update_endpoint: String,
}

impl SparqlClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SparqlError> {
        let query_endpoint = endpoint.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| SparqlError::Unreachable {
                endpoint: query_endpoint.clone(),
                source,
            })?;

        Ok(Self {
            client,
            update_endpoint: update_endpoint_for(&query_endpoint),
            query_endpoint,
        })
    }

    pub fn update_endpoint(&self) -> &str {
        &self.update_endpoint
    }

    fn transport_error(endpoint: &str, err: reqwest::Error) -> SparqlError {
        if err.is_timeout() {
            SparqlError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else {
            SparqlError::Unreachable {
                endpoint: endpoint.to_string(),
                source: err,
            }
        }
    }

    async fn check_status(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SparqlError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        debug!("SPARQL error body from {}: {}", endpoint, body);
        Err(SparqlError::Status {
            endpoint: endpoint.to_string(),
            status,
            body,
        })
    }
}

#[async_trait]
impl QueryEngine for SparqlClient {
    async fn select(&self, query: &str) -> Result<SparqlResults, SparqlError> {
        let endpoint = self.query_endpoint.as_str();
        debug!("SPARQL query to {}:\n{}", endpoint, query);

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, SPARQL_QUERY)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .body(query.to_string())
            .send()
            .await
            .map_err(|e| Self::transport_error(endpoint, e))?;

        let response = Self::check_status(endpoint, response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Self::transport_error(endpoint, e))?;

        let results: SparqlResults =
            serde_json::from_str(&body).map_err(|e| SparqlError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        debug!("SPARQL query returned {} rows", results.rows().len());
        Ok(results)
    }

    async fn update(&self, update: &str) -> Result<(), SparqlError> {
        let endpoint = self.update_endpoint.as_str();
        debug!("SPARQL update to {}:\n{}", endpoint, update);

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, SPARQL_UPDATE)
            .body(update.to_string())
            .send()
            .await
            .map_err(|e| Self::transport_error(endpoint, e))?;

        Self::check_status(endpoint, response).await?;
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.query_endpoint
    }
}
