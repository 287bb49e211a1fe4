//! Endpoints answer one page query with a raw SPARQL JSON results body.
//!
//! Classifying the body is left to [`crate::PageFetcher`], so every
//! endpoint only has to report transport-level failures itself.

mod http;
mod store;

pub use http::HttpEndpoint;
pub use store::StoreEndpoint;

use crate::error::FetchError;

pub trait Endpoint {
    /// Issue one request for `query` and return the response body.
    fn request(&self, query: &str) -> Result<String, FetchError>;
}

impl<E: Endpoint + ?Sized> Endpoint for &E {
    fn request(&self, query: &str) -> Result<String, FetchError> {
        (**self).request(query)
    }
}

impl<E: Endpoint + ?Sized> Endpoint for Box<E> {
    fn request(&self, query: &str) -> Result<String, FetchError> {
        (**self).request(query)
    }
}
