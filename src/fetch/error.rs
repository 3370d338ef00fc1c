use std::time::Duration;

use thiserror::Error;

/// Failures of an outbound fetch. All of them surface to the caller as an
/// upstream error.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The target is not an absolute URI.
    #[error("invalid target URI '{uri}': {source}")]
    InvalidTarget {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    /// Connection, TLS, or protocol failure on some hop.
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The redirect chain did not produce final headers in time.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// The redirect chain exceeded the hop limit.
    #[error("more than {0} redirects")]
    TooManyRedirects(usize),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}
