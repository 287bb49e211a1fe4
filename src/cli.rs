use clap::Parser;
use sparql_pager::config::{DEFAULT_ERROR_MARKER, DEFAULT_GRAPH, DEFAULT_MEASURE_FILE, PagerConfig};
use sparql_pager::{DEFAULT_PAGE_SIZE, SinkError, StoreError, UsageError};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use thiserror::Error;

pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "sparql-pager",
    about = "Execute a SPARQL query against a LIMIT/OFFSET endpoint and retrieve every result",
    version
)]
pub struct Cli {
    /// SPARQL endpoint URL
    #[arg(required_unless_present = "local")]
    pub server: Option<String>,

    /// Evaluate the given SPARQL query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Evaluate the SPARQL query in the given file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Append execution time (seconds) and call count to this file
    #[arg(short, long, default_value = DEFAULT_MEASURE_FILE, env = "SPARQL_PAGER_MEASURE")]
    pub measure: PathBuf,

    /// Do not perform any measurement
    #[arg(short, long)]
    pub silent: bool,

    /// Number of results requested per page
    #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE, env = "SPARQL_PAGER_LIMIT")]
    pub limit: usize,

    /// Default graph IRI sent with every request
    #[arg(short = 'g', long, default_value = DEFAULT_GRAPH, env = "SPARQL_PAGER_DEFAULT_GRAPH")]
    pub default_graph: String,

    /// Server-side timeout hint, in milliseconds
    #[arg(long, default_value_t = 300_000)]
    pub server_timeout: u64,

    /// Stop requesting pages after this many milliseconds
    #[arg(short, long, env = "SPARQL_PAGER_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Local timeout of a single HTTP request, in seconds
    #[arg(long, default_value_t = 300)]
    pub request_timeout: u64,

    /// Regular expression identifying an endpoint error response
    #[arg(long, default_value = DEFAULT_ERROR_MARKER)]
    pub error_marker: String,

    /// Also record the average response time per call
    #[arg(long)]
    pub latency: bool,

    /// Answer pages from a Turtle file loaded in memory instead of a server
    #[arg(long, value_name = "TURTLE", conflicts_with = "server")]
    pub local: Option<PathBuf>,

    /// Enable verbose logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> PagerConfig {
        PagerConfig {
            page_size: self.limit,
            default_graph: self.default_graph.clone(),
            server_timeout: Duration::from_millis(self.server_timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
            session_timeout: self.timeout.map(Duration::from_millis),
            error_marker: self.error_marker.clone(),
            ..PagerConfig::default()
        }
    }
}

/// Errors that end the process.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(#[from] UsageError),

    #[error("cannot create HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Sink(#[from] SinkError),
}

pub type CliResult<T> = Result<T, CliError>;

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("Error: {err}");
    let code = match &err {
        CliError::Usage(_) => EXIT_USAGE,
        _ => EXIT_ERROR,
    };
    process::exit(code)
}
