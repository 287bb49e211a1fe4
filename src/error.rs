use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single page fetch.
///
/// Both variants end the pagination session but never the process: the
/// bindings gathered before the failing page are still reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The transport could not complete (refused, reset, local timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered but signalled a failure, or its body could not
    /// be decoded as SPARQL JSON results.
    #[error("endpoint error: {0}")]
    Endpoint(String),
}

/// Caller supplied no usable query or settings. Raised before any request.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("you must specify exactly one SPARQL endpoint to use")]
    NoEndpoint,

    #[error("you must specify a SPARQL query to execute (use --query or --file)")]
    NoQuery,

    #[error("cannot read query file {}: {source}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid SPARQL query: {0}")]
    Syntax(String),

    #[error("only SELECT queries can be paginated, got {0}")]
    NotSelect(&'static str),

    #[error("page size must be at least 1")]
    ZeroPageSize,

    #[error("invalid endpoint error marker: {0}")]
    InvalidErrorMarker(#[from] regex::Error),
}

/// Failure while writing results or the measurement log.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode binding: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("cannot append to measurement file {}: {source}", path.display())]
    Measurement {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure while building the in-process store endpoint.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load data into the store: {0}")]
    Load(String),
}
