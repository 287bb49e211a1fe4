use super::Endpoint;
use crate::config::PagerConfig;
use crate::error::FetchError;
use reqwest::blocking::Client;
use std::fmt;
use tracing::debug;

/// SPARQL endpoint reached over HTTP GET.
///
/// One client is built per endpoint and reused for every page, so the
/// keep-alive connections of its pool carry the whole session.
pub struct HttpEndpoint {
    client: Client,
    url: String,
    default_graph: String,
    format: String,
    server_timeout_ms: String,
}

impl fmt::Debug for HttpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpEndpoint")
            .field("url", &self.url)
            .field("default_graph", &self.default_graph)
            .finish()
    }
}

impl HttpEndpoint {
    pub fn new(url: &str, config: &PagerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(config.max_idle_connections)
            .pool_idle_timeout(config.idle_timeout)
            .tcp_keepalive(config.idle_timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            default_graph: config.default_graph.clone(),
            format: config.result_format.clone(),
            server_timeout_ms: config.server_timeout.as_millis().to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_network_error(e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Network(format!("request timed out: {e}"))
        } else if e.is_connect() {
            FetchError::Network(format!("connection failed: {e}"))
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

impl Endpoint for HttpEndpoint {
    fn request(&self, query: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("default-graph-uri", self.default_graph.as_str()),
                ("query", query),
                ("format", self.format.as_str()),
                ("timeout", self.server_timeout_ms.as_str()),
            ])
            .send()
            .map_err(Self::map_network_error)?;

        let status = response.status();
        let body = response.text().map_err(Self::map_network_error)?;
        debug!(%status, bytes = body.len(), "endpoint responded");
        Ok(body)
    }
}
