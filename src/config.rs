use crate::error::UsageError;
use crate::rewriter::DEFAULT_PAGE_SIZE;
use regex::Regex;
use std::time::Duration;

/// Default-graph IRI sent with every page request.
pub const DEFAULT_GRAPH: &str = "http://localhost:8890/watdiv10m";
/// Result format requested from the endpoint.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
/// Text an endpoint puts in a body that reports its own failure.
pub const DEFAULT_ERROR_MARKER: &str = "Virtuoso";
pub const DEFAULT_MEASURE_FILE: &str = "./execution_times_virtuo.csv";
/// Server-side evaluation timeout hint, five minutes.
pub const DEFAULT_SERVER_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Settings for one pagination session.
#[derive(Debug, Clone)]
pub struct PagerConfig {
    pub page_size: usize,
    pub default_graph: String,
    pub result_format: String,
    /// Sent to the endpoint as the `timeout` parameter, in milliseconds.
    pub server_timeout: Duration,
    /// Local timeout of one HTTP request.
    pub request_timeout: Duration,
    /// Bound on the whole session; checked between pages.
    pub session_timeout: Option<Duration>,
    /// Regular expression matched against response bodies.
    pub error_marker: String,
    pub max_idle_connections: usize,
    pub idle_timeout: Duration,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            default_graph: DEFAULT_GRAPH.to_string(),
            result_format: SPARQL_RESULTS_JSON.to_string(),
            server_timeout: DEFAULT_SERVER_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            session_timeout: None,
            error_marker: DEFAULT_ERROR_MARKER.to_string(),
            max_idle_connections: 10,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

impl PagerConfig {
    pub fn error_marker_regex(&self) -> Result<Regex, UsageError> {
        Ok(Regex::new(&self.error_marker)?)
    }
}
