//! Page Fetch Module
//!
//! The external collaborator that retrieves page content for the page cache.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::Client;

use thiserror::Error;
use tracing::debug;

// == Fetch Error ==
/// Failure reported by a page fetcher.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, body read)
    #[error("Fetch failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Fetch of {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Any other fetcher-specific failure
    #[error("Fetch failed: {0}")]
    Other(String),
}

// == Page Fetcher Trait ==
/// Retrieves the content behind a URL.
///
/// Any `Fn(&str) -> Result<String, FetchError>` closure is a fetcher, which
/// keeps test doubles to a single line.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

impl<F> PageFetcher for F
where
    F: Fn(&str) -> Result<String, FetchError> + Send + Sync,
{
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self(url)
    }
}

// == HTTP Fetcher ==
/// Fetches pages over HTTP with a blocking client.
///
/// The client is built on the first fetch and reused afterwards, so the
/// fetcher itself can be created from async code. `fetch` must run on a
/// blocking thread.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    client: OnceLock<Client>,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests time out after `timeout_secs`.
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&Client, FetchError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder().timeout(self.timeout).build()?;
        // A concurrent first fetch may have won the race; its client is kept
        Ok(self.client.get_or_init(|| client))
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching {}", url);
        let response = self.client()?.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text()?)
    }
}
