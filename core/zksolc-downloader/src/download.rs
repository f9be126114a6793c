//! The download capability and its HTTP implementation.
//!
//! The session never talks HTTP itself; it is handed an
//! `Arc<dyn CompilerDownload>` and only asks it to "fetch URL to path".
//! [`ReqwestDownloader`] is the production implementation:
//!
//! - Streaming downloads (the body is never held in memory)
//! - Automatic retry with exponential backoff (3 attempts)
//! - Downloads to a temporary file, then renames on success
//! - Fixed timeout per request

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use futures_util::StreamExt;
use rand::Rng;
use tokio::io::AsyncWriteExt;

/// Fetches a remote resource into a local file.
///
/// Implementations must either leave a complete file at `dest` or return an
/// error; a partially written `dest` is never acceptable.
///
/// This trait uses `async_trait` so it can be used as `Arc<dyn CompilerDownload>`.
#[async_trait]
pub trait CompilerDownload: Send + Sync {
    /// Downloads `url` to `dest`, creating parent directories as needed.
    async fn download(&self, url: &str, dest: &Path) -> anyhow::Result<()>;
}

/// Maximum number of download attempts.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// User-Agent header for HTTP requests.
const USER_AGENT: &str = concat!("zksolc-downloader/", env!("CARGO_PKG_VERSION"));

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestDownloader {
    client: reqwest::Client,
    max_retries: u32,
}

impl ReqwestDownloader {
    /// Creates a downloader with the default timeout and retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Creates a downloader with a custom per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Overrides the number of attempts (minimum 1).
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Streams `url` into `dest`.
    async fn fetch_once(&self, url: &str, dest: &Path) -> anyhow::Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to connect to {url}"))?;

        if !response.status().is_success() {
            bail!("HTTP error {}: {url}", response.status());
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create file: {}", dest.display()))?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| format!("Failed to read chunk from {url}"))?;
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write to {}", dest.display()))?;
            downloaded += chunk.len() as u64;
        }

        file.flush()
            .await
            .with_context(|| format!("Failed to flush {}", dest.display()))?;

        Ok(downloaded)
    }
}

#[async_trait]
impl CompilerDownload for ReqwestDownloader {
    async fn download(&self, url: &str, dest: &Path) -> anyhow::Result<()> {
        let temp_path = temp_path_for(dest);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = calculate_retry_delay(attempt);
                tracing::debug!(
                    url,
                    attempt = attempt + 1,
                    max = self.max_retries,
                    delay_ms = delay,
                    "retrying download"
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.fetch_once(url, &temp_path).await {
                Ok(bytes) => {
                    tokio::fs::rename(&temp_path, dest).await.with_context(|| {
                        format!(
                            "Failed to rename {} to {}",
                            temp_path.display(),
                            dest.display()
                        )
                    })?;
                    tracing::debug!(url, bytes, dest = %dest.display(), "download complete");
                    return Ok(());
                }
                Err(e) => {
                    let _ = tokio::fs::remove_file(&temp_path).await;
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            anyhow::anyhow!("Download failed after {} attempts", self.max_retries)
        }))
    }
}

/// Returns `<dest>.tmp`, keeping the original extension in the name.
///
/// Version strings contain dots, so `Path::with_extension` would clobber them.
fn temp_path_for(dest: &Path) -> std::path::PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    dest.with_file_name(name)
}

/// Calculates the retry delay with exponential backoff and jitter.
///
/// The delay doubles with each attempt (1s, 2s, 4s) with +/- 25% jitter.
fn calculate_retry_delay(attempt: u32) -> u64 {
    let base_delay = BASE_RETRY_DELAY_MS * 2u64.pow(attempt);
    let jitter_range = base_delay / 4;
    let jitter = rand::rng().random_range(0..=jitter_range * 2);
    base_delay - jitter_range + jitter
}
