//! Local cache of the published compiler version manifest.
//!
//! ## Manifest Format
//!
//! ```json
//! { "latest": "1.3.13", "minVersion": "1.3.0" }
//! ```
//!
//! ## Staleness
//!
//! The cache expires `ttl` after the file was *created*, not after it was last
//! modified. The transport replaces the file via rename, so every successful
//! fetch restarts the clock. Filesystems that do not record a creation time fall
//! back to the modification time.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::download::CompilerDownload;
use crate::errors::{DownloaderError, Result};
use crate::paths;

/// The currently published window of supported compiler versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerVersionInfo {
    /// Newest published version.
    pub latest: semver::Version,
    /// Oldest version still supported.
    pub min_version: semver::Version,
}

/// Handle on the manifest file under a compilers directory.
#[derive(Debug, Clone)]
pub struct ManifestCache {
    path: PathBuf,
}

impl ManifestCache {
    /// Creates a handle for `<compilers_dir>/zksolc/compilerVersionInfo.json`.
    #[must_use]
    pub fn new(compilers_dir: &Path) -> Self {
        Self {
            path: paths::manifest_path(compilers_dir),
        }
    }

    /// Path of the manifest file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the manifest file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads and parses the cached manifest.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DownloaderError::ManifestCorrupt`] if the file cannot be parsed,
    /// or [`DownloaderError::Io`] if it exists but cannot be read.
    pub async fn read(&self) -> Result<Option<CompilerVersionInfo>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DownloaderError::io(
                    format!("Failed to read {}", self.path.display()),
                    e,
                ));
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| DownloaderError::ManifestCorrupt {
                path: self.path.clone(),
                source,
            })
    }

    /// Returns `true` if the manifest is missing or older than `ttl`.
    pub async fn is_stale(&self, ttl: Duration) -> bool {
        let Ok(metadata) = tokio::fs::metadata(&self.path).await else {
            return true;
        };
        let Ok(created) = metadata.created().or_else(|_| metadata.modified()) else {
            return true;
        };
        is_expired(created, SystemTime::now(), ttl)
    }

    /// Downloads the manifest from `url` into the cache.
    ///
    /// # Errors
    ///
    /// Returns [`DownloaderError::ManifestDownload`] carrying the first line of
    /// the outermost transport error. Underlying causes are only logged.
    pub async fn fetch(&self, downloader: &dyn CompilerDownload, url: &str) -> Result<()> {
        tracing::debug!(url, dest = %self.path.display(), "fetching compiler version info");
        downloader
            .download(url, &self.path)
            .await
            .map_err(|e| {
                tracing::debug!(url, error = ?e, "compiler version info download failed");
                DownloaderError::manifest_download(url, &e.to_string())
            })
    }
}

/// Returns `true` if more than `ttl` has elapsed between `created` and `now`.
///
/// A creation time in the future counts as fresh.
fn is_expired(created: SystemTime, now: SystemTime, ttl: Duration) -> bool {
    now.duration_since(created).is_ok_and(|age| age > ttl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use async_trait::async_trait;

    /// Transport that fails the way `reqwest` does: a context over a cause.
    struct Unreachable;

    #[async_trait]
    impl CompilerDownload for Unreachable {
        async fn download(&self, url: &str, _dest: &Path) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("tcp connect error: Connection refused (os error 111)"))
                .with_context(|| format!("Failed to connect to {url}"))
        }
    }

    const SAMPLE: &str = r#"{"latest":"1.3.13","minVersion":"1.3.0"}"#;

    fn seeded(content: &str) -> (TempDir, ManifestCache) {
        let temp = TempDir::new().expect("Should create temp dir");
        temp.child("zksolc")
            .child(paths::VERSION_INFO_FILE)
            .write_str(content)
            .expect("Should write manifest");
        let cache = ManifestCache::new(temp.path());
        (temp, cache)
    }

    #[tokio::test]
    async fn read_parses_camel_case_fields() {
        let (_temp, cache) = seeded(SAMPLE);
        let info = cache.read().await.expect("Should read").expect("Should exist");
        assert_eq!(info.latest, semver::Version::new(1, 3, 13));
        assert_eq!(info.min_version, semver::Version::new(1, 3, 0));
    }

    #[tokio::test]
    async fn read_returns_none_when_absent() {
        let temp = TempDir::new().expect("Should create temp dir");
        let cache = ManifestCache::new(temp.path());
        assert!(cache.read().await.expect("Absence is not an error").is_none());
        assert!(!cache.exists());
    }

    #[tokio::test]
    async fn malformed_json_is_corruption() {
        let (_temp, cache) = seeded("{ not json");
        let err = cache.read().await.expect_err("Should fail");
        assert!(matches!(err, DownloaderError::ManifestCorrupt { .. }));
    }

    #[tokio::test]
    async fn non_semver_field_is_corruption() {
        let (_temp, cache) = seeded(r#"{"latest":"latest","minVersion":"1.3.0"}"#);
        let err = cache.read().await.expect_err("Should fail");
        assert!(matches!(err, DownloaderError::ManifestCorrupt { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_stale() {
        let temp = TempDir::new().expect("Should create temp dir");
        let cache = ManifestCache::new(temp.path());
        assert!(cache.is_stale(Duration::from_secs(3600)).await);
    }

    #[tokio::test]
    async fn fresh_file_is_not_stale() {
        let (_temp, cache) = seeded(SAMPLE);
        assert!(!cache.is_stale(Duration::from_secs(3600)).await);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_only_outer_message() {
        let temp = TempDir::new().expect("Should create temp dir");
        let cache = ManifestCache::new(temp.path());
        let url = "https://example.com/version.json";

        let err = cache.fetch(&Unreachable, url).await.expect_err("Should fail");

        match err {
            DownloaderError::ManifestDownload { message, .. } => {
                assert_eq!(message, format!("Failed to connect to {url}"));
                assert!(!message.contains("os error"));
            }
            other => panic!("Expected ManifestDownload, got {other:?}"),
        }
    }

    #[test]
    fn expiry_is_strictly_after_ttl() {
        let created = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let ttl = Duration::from_secs(60);

        assert!(!is_expired(created, created + Duration::from_secs(60), ttl));
        assert!(is_expired(created, created + Duration::from_secs(61), ttl));
    }

    #[test]
    fn future_creation_time_is_fresh() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let created = now + Duration::from_secs(10);
        assert!(!is_expired(created, now, Duration::ZERO));
    }

    #[test]
    fn version_info_round_trips_field_names() {
        let info: CompilerVersionInfo = serde_json::from_str(SAMPLE).expect("Should parse");
        let json = serde_json::to_string(&info).expect("Should serialize");
        assert!(json.contains("\"minVersion\""));
    }
}
