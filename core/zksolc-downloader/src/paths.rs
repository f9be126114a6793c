//! On-disk layout of the compilers directory.
//!
//! ```text
//! <compilers dir>/
//!   zksolc/
//!     compilerVersionInfo.json       # cached version manifest
//!     zksolc-v1.3.13                 # binary from the default repository
//!     zksolc-v1.3.13-4f1c0e2a9b7d6e5c  # binary from a custom URL (salted)
//! ```
//!
//! Everything here is pure path arithmetic; nothing touches the filesystem.

use std::fmt;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::platform::Platform;

/// Name of the compiler, used both as directory and file prefix.
pub const TOOL_NAME: &str = "zksolc";

/// File name of the cached version manifest.
pub const VERSION_INFO_FILE: &str = "compilerVersionInfo.json";

/// Number of hex characters of the URL digest kept in a salt.
const SALT_LEN: usize = 16;

/// Where the compiler binary comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerSource {
    /// The canonical binary repository.
    Repository,
    /// A user-supplied download URL, used verbatim.
    Url(String),
    /// A user-supplied local path. Downloads still come from the repository.
    Path(PathBuf),
}

impl CompilerSource {
    /// Classifies a configured compiler path.
    ///
    /// Empty or missing values select the default repository. Strings that parse
    /// as `http`/`https` URLs are custom URLs; anything else is a local path.
    #[must_use]
    pub fn from_config(configured: Option<&str>) -> Self {
        let Some(value) = configured.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Repository;
        };

        match reqwest::Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(value.to_string()),
            _ => Self::Path(PathBuf::from(value)),
        }
    }

    /// Returns `true` for [`CompilerSource::Url`].
    #[must_use]
    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// Returns the filename salt for this source, if any.
    #[must_use]
    pub fn salt(&self) -> Option<String> {
        match self {
            Self::Url(url) => Some(salt_from_url(url)),
            Self::Repository | Self::Path(_) => None,
        }
    }
}

impl fmt::Display for CompilerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repository => write!(f, "default repository"),
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Computes the stable salt for a custom download URL.
///
/// The salt is the lowercase hex SHA-256 of the URL, truncated to 16 characters.
#[must_use]
pub fn salt_from_url(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut salt = hex::encode(digest);
    salt.truncate(SALT_LEN);
    salt
}

/// Returns `<dir>/zksolc`.
#[must_use]
pub fn tool_dir(compilers_dir: &Path) -> PathBuf {
    compilers_dir.join(TOOL_NAME)
}

/// Returns the path of the cached version manifest.
#[must_use]
pub fn manifest_path(compilers_dir: &Path) -> PathBuf {
    tool_dir(compilers_dir).join(VERSION_INFO_FILE)
}

/// Returns the path of the compiler binary for `version` fetched from `source`.
#[must_use]
pub fn binary_path(
    compilers_dir: &Path,
    version: &str,
    source: &CompilerSource,
    platform: Platform,
) -> PathBuf {
    let mut name = format!("{TOOL_NAME}-v{version}");
    if let Some(salt) = source.salt() {
        name.push('-');
        name.push_str(&salt);
    }
    name.push_str(platform.executable_extension());
    tool_dir(compilers_dir).join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIR: &str = "/var/cache/compilers";

    #[test]
    fn repository_binary_has_no_salt() {
        let path = binary_path(
            Path::new(DIR),
            "1.3.5",
            &CompilerSource::Repository,
            Platform::LinuxAmd64,
        );
        assert_eq!(path, PathBuf::from("/var/cache/compilers/zksolc/zksolc-v1.3.5"));
    }

    #[test]
    fn local_path_source_has_no_salt() {
        let source = CompilerSource::from_config(Some("/opt/zksolc/bin/zksolc"));
        assert_eq!(source, CompilerSource::Path(PathBuf::from("/opt/zksolc/bin/zksolc")));
        let path = binary_path(Path::new(DIR), "1.3.5", &source, Platform::LinuxAmd64);
        assert!(path.ends_with("zksolc-v1.3.5"));
    }

    #[test]
    fn url_binary_is_salted() {
        let url = "https://mirror.example.com/zksolc-linux-v1.3.5";
        let source = CompilerSource::from_config(Some(url));
        assert!(source.is_url());

        let path = binary_path(Path::new(DIR), "1.3.5", &source, Platform::LinuxAmd64);
        let expected = format!("zksolc-v1.3.5-{}", salt_from_url(url));
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(expected.as_str()));
    }

    #[test]
    fn salt_is_deterministic() {
        let url = "https://mirror.example.com/zksolc";
        assert_eq!(salt_from_url(url), salt_from_url(url));
        assert_eq!(salt_from_url(url).len(), SALT_LEN);
        assert!(salt_from_url(url).chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_urls_produce_different_salts() {
        let a = salt_from_url("https://a.example.com/zksolc");
        let b = salt_from_url("https://b.example.com/zksolc");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_config_selects_repository() {
        assert_eq!(CompilerSource::from_config(None), CompilerSource::Repository);
        assert_eq!(CompilerSource::from_config(Some("  ")), CompilerSource::Repository);
    }

    #[test]
    fn non_http_scheme_is_treated_as_path() {
        let source = CompilerSource::from_config(Some("C:\\tools\\zksolc.exe"));
        assert!(!source.is_url());
    }

    #[test]
    fn windows_binary_gets_exe_extension() {
        let path = binary_path(
            Path::new(DIR),
            "1.3.13",
            &CompilerSource::Repository,
            Platform::WindowsAmd64,
        );
        assert!(path.to_string_lossy().ends_with("zksolc-v1.3.13.exe"));
    }

    #[test]
    fn manifest_lives_in_tool_dir() {
        assert_eq!(
            manifest_path(Path::new(DIR)),
            PathBuf::from("/var/cache/compilers/zksolc/compilerVersionInfo.json")
        );
    }
}
