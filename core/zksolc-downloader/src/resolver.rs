//! Version resolution against the published window.
//!
//! Order of checks:
//!
//! 1. `"latest"` or an exact string match with `latest` resolves to `latest`,
//!    whatever `minVersion` says.
//! 2. Anything else must parse as semver and satisfy
//!    `minVersion <= requested <= latest`.
//! 3. An in-range pin that is not `latest` is accepted with an advisory.

use std::fmt;

use crate::errors::{DownloaderError, Result};
use crate::manifest::CompilerVersionInfo;

/// Alias accepted in place of a concrete version.
pub const LATEST_ALIAS: &str = "latest";

/// A non-fatal observation surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// The pinned version is older than the published latest.
    BehindLatest {
        /// The pinned version.
        version: String,
        /// The published latest version.
        latest: String,
    },
    /// The binary reports a different version than the one requested.
    VersionMismatch {
        /// The resolved version label.
        expected: String,
        /// What `zksolc --version` printed.
        reported: String,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BehindLatest { version, latest } => write!(
                f,
                "the zksolc compiler version ({version}) is not the latest; \
                 we recommend using the latest version {latest}"
            ),
            Self::VersionMismatch { expected, reported } => write!(
                f,
                "zksolc binary reports version {reported}, expected {expected}"
            ),
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The concrete version to install.
    pub version: String,
    /// Set when the version is accepted but behind latest.
    pub advisory: Option<Advisory>,
}

/// Resolves `requested` against the manifest window.
///
/// # Errors
///
/// - [`DownloaderError::InvalidVersion`] if `requested` is not semver
/// - [`DownloaderError::VersionOutOfRange`] if it lies outside `[minVersion, latest]`
pub fn resolve_version(requested: &str, info: &CompilerVersionInfo) -> Result<Resolution> {
    let latest = info.latest.to_string();

    if requested == LATEST_ALIAS || requested == latest {
        return Ok(Resolution {
            version: latest,
            advisory: None,
        });
    }

    let parsed =
        semver::Version::parse(requested).map_err(|source| DownloaderError::InvalidVersion {
            requested: requested.to_string(),
            source,
        })?;

    if parsed < info.min_version || parsed > info.latest {
        return Err(DownloaderError::version_out_of_range(
            requested,
            &info.min_version,
            &info.latest,
        ));
    }

    Ok(Resolution {
        version: requested.to_string(),
        advisory: Some(Advisory::BehindLatest {
            version: requested.to_string(),
            latest,
        }),
    })
}
