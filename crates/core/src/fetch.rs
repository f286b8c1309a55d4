//! Page fetching.
//!
//! [`PageFetcher`] is the seam between the pipeline and the network:
//! production code uses [`HttpFetcher`], tests substitute an in-memory
//! implementation. The HTTP client is built once per run and reused
//! across every request in a crawl.

use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::{Result, WebtomeError};

const DEFAULT_USER_AGENT: &str = concat!("webtome/", env!("CARGO_PKG_VERSION"));

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: DEFAULT_USER_AGENT.to_string() }
    }
}

/// Source of page bodies for the pipeline.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// Fetches a URL and returns its body as text.
    async fn fetch(&self, url: &Url) -> Result<String>;

    /// Fetches a URL and returns its body as raw bytes, for images and
    /// other binary assets.
    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>>;
}

/// Network-backed fetcher using a shared `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: u64,
}

impl HttpFetcher {
    /// Builds a fetcher from the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`WebtomeError::HttpError`] when the TLS backend cannot
    /// be initialized.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, timeout: config.timeout })
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        debug!(%url, "fetching");
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "text/html,application/xhtml+xml,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| self.map_timeout(e))?;

        response.error_for_status().map_err(WebtomeError::from)
    }

    fn map_timeout(&self, error: reqwest::Error) -> WebtomeError {
        if error.is_timeout() {
            WebtomeError::Timeout { timeout: self.timeout }
        } else {
            WebtomeError::from(error)
        }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| self.map_timeout(e))
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(|e| self.map_timeout(e))?;
        Ok(bytes.to_vec())
    }
}

/// Reads a local HTML file, for converting saved pages.
pub fn fetch_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(WebtomeError::FileNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}
