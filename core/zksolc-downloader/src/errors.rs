//! Error types for compiler acquisition.
//!
//! Every fatal condition the session can hit is a variant of [`DownloaderError`].
//! Variants carry structured fields (requested version, window bounds, transport
//! message) so hosts can match on them instead of parsing message text.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = DownloaderError> = std::result::Result<T, E>;

/// Consolidated error type for compiler acquisition.
#[derive(Debug, Error)]
pub enum DownloaderError {
    /// The version manifest could not be fetched.
    #[error("could not download compiler version info file from {url}: {message}")]
    ManifestDownload {
        /// The version info URL.
        url: String,
        /// First line of the transport diagnostic.
        message: String,
    },

    /// The version manifest is still absent after a fetch attempt.
    #[error("could not get compiler version info: {} does not exist", path.display())]
    ManifestNotFound {
        /// Where the manifest was expected.
        path: PathBuf,
    },

    /// The cached manifest exists but cannot be parsed.
    #[error("compiler version info file {} is corrupted", path.display())]
    ManifestCorrupt {
        /// Path of the unreadable manifest.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The requested version lies outside the supported window.
    #[error(
        "the zksolc compiler version ({requested}) is not supported: \
         the minimum supported version is {min_version}, the latest supported version is {latest}"
    )]
    VersionOutOfRange {
        /// The version string the caller asked for.
        requested: String,
        /// Lower bound of the window.
        min_version: String,
        /// Upper bound of the window.
        latest: String,
    },

    /// The requested version is neither "latest" nor a semantic version.
    #[error("invalid zksolc compiler version: {requested}")]
    InvalidVersion {
        /// The version string the caller asked for.
        requested: String,
        /// The underlying semver parse error.
        #[source]
        source: semver::Error,
    },

    /// The compiler binary could not be fetched.
    #[error("could not download zksolc compiler from {url}: {message}")]
    BinaryDownload {
        /// The URL the binary was fetched from.
        url: String,
        /// First line of the transport diagnostic.
        message: String,
    },

    /// The compiler binary did not run or did not report a version.
    #[error("zksolc binary at {} is corrupted ({reason}); remove it and try again", path.display())]
    BinaryCorrupted {
        /// Path of the broken binary.
        path: PathBuf,
        /// What went wrong while running it.
        reason: String,
    },

    /// The compiler binary did not answer `--version` in time.
    #[error("zksolc binary at {} did not report its version within {timeout:?}", path.display())]
    VerificationTimeout {
        /// Path of the binary.
        path: PathBuf,
        /// The configured verification timeout.
        timeout: Duration,
    },

    /// The host OS/architecture has no published binary.
    #[error("unsupported platform: {os} on {arch}")]
    UnsupportedPlatform {
        /// `std::env::consts::OS`.
        os: String,
        /// `std::env::consts::ARCH`.
        arch: String,
    },

    /// Local filesystem failure.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the operation that failed.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Discriminant of [`DownloaderError`], recorded in a failed session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`DownloaderError::ManifestDownload`].
    ManifestDownload,
    /// See [`DownloaderError::ManifestNotFound`].
    ManifestNotFound,
    /// See [`DownloaderError::ManifestCorrupt`].
    ManifestCorrupt,
    /// See [`DownloaderError::VersionOutOfRange`].
    VersionOutOfRange,
    /// See [`DownloaderError::InvalidVersion`].
    InvalidVersion,
    /// See [`DownloaderError::BinaryDownload`].
    BinaryDownload,
    /// See [`DownloaderError::BinaryCorrupted`].
    BinaryCorrupted,
    /// See [`DownloaderError::VerificationTimeout`].
    VerificationTimeout,
    /// See [`DownloaderError::UnsupportedPlatform`].
    UnsupportedPlatform,
    /// See [`DownloaderError::Io`].
    Io,
}

impl DownloaderError {
    /// Creates a `ManifestDownload` error, keeping only the first line of `message`.
    #[must_use]
    pub fn manifest_download(url: impl Into<String>, message: &str) -> Self {
        Self::ManifestDownload {
            url: url.into(),
            message: first_line(message),
        }
    }

    /// Creates a `ManifestNotFound` error.
    #[must_use]
    pub fn manifest_not_found(path: PathBuf) -> Self {
        Self::ManifestNotFound { path }
    }

    /// Creates a `VersionOutOfRange` error.
    #[must_use]
    pub fn version_out_of_range(
        requested: impl Into<String>,
        min_version: impl ToString,
        latest: impl ToString,
    ) -> Self {
        Self::VersionOutOfRange {
            requested: requested.into(),
            min_version: min_version.to_string(),
            latest: latest.to_string(),
        }
    }

    /// Creates a `BinaryDownload` error, keeping only the first line of `message`.
    #[must_use]
    pub fn binary_download(url: impl Into<String>, message: &str) -> Self {
        Self::BinaryDownload {
            url: url.into(),
            message: first_line(message),
        }
    }

    /// Creates a `BinaryCorrupted` error.
    #[must_use]
    pub fn binary_corrupted(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::BinaryCorrupted {
            path,
            reason: reason.into(),
        }
    }

    /// Creates an `Io` error with context.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ManifestDownload { .. } => ErrorKind::ManifestDownload,
            Self::ManifestNotFound { .. } => ErrorKind::ManifestNotFound,
            Self::ManifestCorrupt { .. } => ErrorKind::ManifestCorrupt,
            Self::VersionOutOfRange { .. } => ErrorKind::VersionOutOfRange,
            Self::InvalidVersion { .. } => ErrorKind::InvalidVersion,
            Self::BinaryDownload { .. } => ErrorKind::BinaryDownload,
            Self::BinaryCorrupted { .. } => ErrorKind::BinaryCorrupted,
            Self::VerificationTimeout { .. } => ErrorKind::VerificationTimeout,
            Self::UnsupportedPlatform { .. } => ErrorKind::UnsupportedPlatform,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Returns the first line of a possibly multi-line transport message.
fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().trim_end().to_string()
}
