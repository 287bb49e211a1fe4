use crate::config::DEFAULT_ERROR_MARKER;
use crate::endpoint::Endpoint;
use crate::error::FetchError;
use crate::session::{Binding, PaginationSession};
use regex::Regex;
use serde::Deserialize;
use std::time::Instant;
use tracing::debug;

/// Body of a SPARQL JSON results document. Only `results.bindings` is read.
#[derive(Debug, Deserialize)]
struct SparqlResults {
    results: SparqlResultsData,
}

#[derive(Debug, Deserialize)]
struct SparqlResultsData {
    bindings: Vec<Binding>,
}

/// Performs one windowed request and classifies what came back.
pub struct PageFetcher<E> {
    endpoint: E,
    /// `None` matches the plain default marker text.
    error_marker: Option<Regex>,
}

impl<E: Endpoint> PageFetcher<E> {
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            error_marker: None,
        }
    }

    pub fn with_error_marker(mut self, marker: Regex) -> Self {
        self.error_marker = Some(marker);
        self
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Fetch one page.
    ///
    /// The call is counted on `session` whatever the outcome, so measurements
    /// include the request that ended a failed session.
    pub fn fetch(
        &self,
        session: &mut PaginationSession,
        query: &str,
    ) -> Result<Vec<Binding>, FetchError> {
        session.record_call();
        let started = Instant::now();
        let outcome = self.endpoint.request(query);
        session.record_response_time(started.elapsed());
        self.classify(&outcome?)
    }

    /// Turn a response body into bindings, or an endpoint error.
    pub fn classify(&self, body: &str) -> Result<Vec<Binding>, FetchError> {
        let marked = match &self.error_marker {
            Some(marker) => marker.is_match(body),
            None => body.contains(DEFAULT_ERROR_MARKER),
        };
        if marked {
            return Err(FetchError::Endpoint(body.trim().to_string()));
        }
        let results: SparqlResults = serde_json::from_str(body).map_err(|e| {
            debug!(error = %e, "undecodable response body");
            FetchError::Endpoint(format!("undecodable response: {e}"))
        })?;
        Ok(results.results.bindings)
    }
}
