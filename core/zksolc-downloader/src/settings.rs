//! Session settings with environment overrides.
//!
//! | Variable                        | Default                                                              |
//! |---------------------------------|----------------------------------------------------------------------|
//! | `ZKSOLC_BIN_REPOSITORY`         | `https://github.com/matter-labs/zksolc-bin/raw/main`                 |
//! | `ZKSOLC_VERSION_INFO_URL`       | `https://raw.githubusercontent.com/matter-labs/zksolc-bin/main/version.json` |
//! | `ZKSOLC_VERSION_INFO_TTL_SECS`  | `86400`                                                              |
//! | `ZKSOLC_VERIFY_TIMEOUT_SECS`    | unset (no timeout)                                                   |
//!
//! Empty or whitespace-only values are treated as unset. Unparseable numbers are
//! ignored with a warning.

use std::time::Duration;

use crate::errors::Result;
use crate::platform::Platform;

/// Environment variable overriding the binary repository root.
pub const BIN_REPOSITORY_ENV: &str = "ZKSOLC_BIN_REPOSITORY";

/// Environment variable overriding the version info URL.
pub const VERSION_INFO_URL_ENV: &str = "ZKSOLC_VERSION_INFO_URL";

/// Environment variable overriding the manifest cache TTL, in seconds.
pub const VERSION_INFO_TTL_ENV: &str = "ZKSOLC_VERSION_INFO_TTL_SECS";

/// Environment variable setting the verification timeout, in seconds.
pub const VERIFY_TIMEOUT_ENV: &str = "ZKSOLC_VERIFY_TIMEOUT_SECS";

/// Default root of the canonical binary repository.
pub const DEFAULT_BIN_REPOSITORY: &str = "https://github.com/matter-labs/zksolc-bin/raw/main";

/// Default location of the published version manifest.
pub const DEFAULT_VERSION_INFO_URL: &str =
    "https://raw.githubusercontent.com/matter-labs/zksolc-bin/main/version.json";

/// Default manifest cache period: 24 hours.
pub const DEFAULT_VERSION_INFO_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Immutable configuration of a downloader session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderSettings {
    /// Root URL of the canonical binary repository, without trailing slash.
    pub binary_repository: String,
    /// URL of the published version manifest.
    pub version_info_url: String,
    /// How long a cached manifest stays fresh.
    pub version_info_ttl: Duration,
    /// Upper bound for `zksolc --version`; `None` waits indefinitely.
    pub verify_timeout: Option<Duration>,
    /// Platform whose binary is downloaded.
    pub platform: Platform,
}

impl DownloaderSettings {
    /// Default settings for `platform`.
    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            binary_repository: DEFAULT_BIN_REPOSITORY.to_string(),
            version_info_url: DEFAULT_VERSION_INFO_URL.to_string(),
            version_info_ttl: DEFAULT_VERSION_INFO_TTL,
            verify_timeout: None,
            platform,
        }
    }

    /// Default settings for the detected host platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the host platform has no published binary.
    pub fn detect() -> Result<Self> {
        Ok(Self::for_platform(Platform::detect()?))
    }

    /// Detected defaults with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the host platform has no published binary.
    pub fn from_env() -> Result<Self> {
        Ok(Self::detect()?.with_env_overrides())
    }

    /// Applies the `ZKSOLC_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(repo) = env_string(BIN_REPOSITORY_ENV) {
            self.binary_repository = repo;
        }
        if let Some(url) = env_string(VERSION_INFO_URL_ENV) {
            self.version_info_url = url;
        }
        if let Some(ttl) = env_secs(VERSION_INFO_TTL_ENV) {
            self.version_info_ttl = ttl;
        }
        if let Some(timeout) = env_secs(VERIFY_TIMEOUT_ENV) {
            self.verify_timeout = Some(timeout);
        }
        self
    }

    /// Builds the canonical download URL for `version`.
    #[must_use]
    pub fn canonical_binary_url(&self, version: &str) -> String {
        format!(
            "{}/{}-v{version}{}",
            self.binary_repository.trim_end_matches('/'),
            self.platform.artifact_name(),
            self.platform.executable_extension()
        )
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_secs(name: &str) -> Option<Duration> {
    let raw = env_string(name)?;
    match raw.parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring non-numeric duration");
            None
        }
    }
}
