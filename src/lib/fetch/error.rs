//! Template fetching error.

use thiserror::Error;


/// Error that may occur while fetching templates from upstream.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The HTTP call to upstream didn't succeed.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// Upstream responded with something we cannot make sense of.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    #[inline]
    pub(crate) fn unavailable<T: ToString>(cause: T) -> Self {
        FetchError::UpstreamUnavailable(cause.to_string())
    }

    #[inline]
    pub(crate) fn malformed<T: ToString>(cause: T) -> Self {
        FetchError::MalformedResponse(cause.to_string())
    }
}
