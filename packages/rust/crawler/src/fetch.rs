//! Page fetching: the [`PageSource`] seam and its HTTP implementation.
//!
//! [`HttpPageSource`] reads through a persistent on-disk cache keyed by the
//! cleaned URL path, and retries transient HTTP failures with exponential
//! backoff.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use valleydocs_shared::{FetchConfig, Result, ValleyDocsError, clean_url};

/// Anything that can return the markup of a site-relative path.
pub trait PageSource {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Statuses worth another attempt.
const RETRY_STATUSES: &[StatusCode] = &[
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

// ---------------------------------------------------------------------------
// HttpPageSource
// ---------------------------------------------------------------------------

/// `reqwest`-backed page source with a disk cache.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    base_url: Url,
    cache_dir: PathBuf,
    max_attempts: u32,
    backoff_factor: Duration,
}

impl HttpPageSource {
    pub fn new(base_url: Url, cache_dir: impl Into<PathBuf>, config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.timeout())
            .build()
            .map_err(|e| ValleyDocsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            cache_dir: cache_dir.into(),
            max_attempts: config.max_attempts.max(1),
            backoff_factor: config.backoff_factor(),
        })
    }

    /// Cache file for a site-relative path: `<cache_dir>/<path>.html`.
    pub fn cache_path(&self, path: &str) -> PathBuf {
        let cleaned = clean_url(path).trim_start_matches('/');
        self.cache_dir.join(format!("{cleaned}.html"))
    }

    async fn fetch_remote(&self, url: &Url) -> Result<String> {
        let mut attempt = 1;
        loop {
            let outcome = self.client.get(url.clone()).send().await;
            let retry_reason = match outcome {
                Ok(response) if RETRY_STATUSES.contains(&response.status()) => {
                    response.status().to_string()
                }
                Ok(response) if !response.status().is_success() => {
                    return Err(ValleyDocsError::Network(format!(
                        "{url}: HTTP {}",
                        response.status()
                    )));
                }
                Ok(response) => {
                    return response.text().await.map_err(|e| {
                        ValleyDocsError::Network(format!("{url}: body read failed: {e}"))
                    });
                }
                Err(e) if e.is_connect() || e.is_timeout() => e.to_string(),
                Err(e) => return Err(ValleyDocsError::Network(format!("{url}: {e}"))),
            };

            if attempt >= self.max_attempts {
                return Err(ValleyDocsError::Network(format!(
                    "{url}: giving up after {attempt} attempts ({retry_reason})"
                )));
            }

            let delay = self.backoff_factor * 2u32.saturating_pow(attempt - 1);
            warn!(%url, attempt, reason = %retry_reason, delay_ms = delay.as_millis(), "retrying fetch");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl PageSource for HttpPageSource {
    #[instrument(skip(self))]
    async fn fetch(&self, path: &str) -> Result<String> {
        let cache_file = self.cache_path(path);
        if let Some(cached) = read_cache(&cache_file).await? {
            debug!(?cache_file, "cache hit");
            return Ok(cached);
        }

        let url = self
            .base_url
            .join(path)
            .map_err(|e| ValleyDocsError::validation(format!("invalid page path {path}: {e}")))?;
        let body = self.fetch_remote(&url).await?;

        if !body.is_empty() {
            write_cache(&cache_file, &body).await?;
        }
        Ok(body)
    }
}

async fn read_cache(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ValleyDocsError::io(path, e)),
    }
}

async fn write_cache(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ValleyDocsError::io(parent, e))?;
    }
    tokio::fs::write(path, body)
        .await
        .map_err(|e| ValleyDocsError::io(path, e))
}
