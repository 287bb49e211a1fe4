//! Complete, stably ordered SPARQL result sets from endpoints that only offer
//! LIMIT/OFFSET windows.
//!
//! A [`QueryRewriter`] imposes an explicit ORDER BY over every variable of the
//! query and windows it; a [`PaginationDriver`] then requests window after
//! window through a [`PageFetcher`] until a short page arrives, and a
//! [`ResultSink`] writes what was gathered, even when a page failed.

pub mod config;
mod driver;
pub mod endpoint;
mod error;
mod fetcher;
pub mod input;
mod parsed_query;
mod rewriter;
mod session;
mod sink;

pub use config::PagerConfig;
pub use driver::PaginationDriver;
pub use endpoint::{Endpoint, HttpEndpoint, StoreEndpoint};
pub use error::{FetchError, SinkError, StoreError, UsageError};
pub use fetcher::PageFetcher;
pub use parsed_query::{ParsedQuery, TriplePatternTerms, VARIABLE_MARKER, variable_name};
pub use rewriter::{DEFAULT_PAGE_SIZE, PageWindow, PagingPlan, QueryRewriter};
pub use session::{Binding, PaginationSession, SessionStatus};
pub use sink::{MeasurementLog, ResultSink};
