//! Module implementing access to the upstream template API.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::model::UPSTREAM_URL;
use super::error::FetchError;


/// Source of the template listing & template images.
///
/// Calls are blocking, so they should be made from a background thread
/// if there is an event loop around.
pub trait Upstream: Send + Sync {
    /// Fetch the raw body of the template listing.
    fn get_memes(&self) -> Result<Vec<u8>, FetchError>;
    /// Fetch the raw bytes of an image under given URL.
    fn get_image(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<U: Upstream + ?Sized> Upstream for Box<U> {
    #[inline]
    fn get_memes(&self) -> Result<Vec<u8>, FetchError> {
        (**self).get_memes()
    }
    #[inline]
    fn get_image(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).get_image(url)
    }
}


/// Default timeout for upstream HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

lazy_static! {
    static ref USER_AGENT: String = format!("{}/{}",
        option_env!("CARGO_PKG_NAME").unwrap_or("memegen"),
        option_env!("CARGO_PKG_VERSION").unwrap_or("0"));
}


/// Upstream accessed over HTTP.
pub struct HttpUpstream {
    client: Client,
    url: String,
}

impl HttpUpstream {
    /// Create an `HttpUpstream` for the default upstream API.
    #[inline]
    pub fn new() -> Result<Self, FetchError> {
        Self::with_url(UPSTREAM_URL, DEFAULT_TIMEOUT)
    }

    /// Create an `HttpUpstream` that lists templates from given URL.
    ///
    /// A timeout of zero disables timeouts altogether.
    pub fn with_url<S: Into<String>>(url: S, timeout: Duration) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(USER_AGENT.as_str());
        builder = if timeout > Duration::from_secs(0) {
            builder.timeout(timeout)
        } else {
            builder.timeout(None)
        };
        let client = builder.build().map_err(|e| {
            error!("Failed to create HTTP client: {}", e);
            FetchError::unavailable(e)
        })?;
        Ok(HttpUpstream{client, url: url.into()})
    }

    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        trace!("GET {}", url);
        let response = self.client.get(url).send().map_err(|e| {
            warn!("HTTP request to {} failed: {}", url, e);
            FetchError::unavailable(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP request to {} returned {}", url, status);
            return Err(FetchError::unavailable(format!("HTTP {}", status)));
        }

        let bytes = response.bytes().map_err(FetchError::unavailable)?;
        debug!("Received {} byte(s) from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

impl Upstream for HttpUpstream {
    fn get_memes(&self) -> Result<Vec<u8>, FetchError> {
        self.get(&self.url)
    }

    fn get_image(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.get(url)
    }
}

impl fmt::Debug for HttpUpstream {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("HttpUpstream").field("url", &self.url).finish()
    }
}
