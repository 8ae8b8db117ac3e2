//! Outbound HTTP for certificate downloads and confirmation callbacks.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::sync::Arc;

use async_trait::async_trait;

mod http;

pub use http::HttpFetcher;

/// Largest response body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// `User-Agent` sent on every outbound request.
pub const USER_AGENT: &str = concat!("sns-verify/", env!("CARGO_PKG_VERSION"));

/// Outbound request failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Server answered with a non-2xx status (redirects included).
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// GET-and-read-text seam used by the verifier and the validator.
///
/// [`HttpFetcher`] is the production implementation; tests provide their own.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the body of a 2xx response as text.
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).get_text(url).await
    }
}
