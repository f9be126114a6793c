#![warn(clippy::pedantic)]

//! Acquisition of the zksolc compiler binary.
//!
//! Given a requested version (or `"latest"`), the crate resolves it against the
//! published version manifest, downloads the matching binary into a compilers
//! directory and checks that it runs.
//!
//! ## Module Structure
//!
//! - [`paths`] - On-disk layout and URL salts
//! - [`platform`] - OS and architecture detection
//! - [`settings`] - Repository URLs, cache TTL, verification timeout
//! - [`manifest`] - Cached version manifest and its staleness
//! - [`resolver`] - Version window checks and advisories
//! - [`download`] - The download capability and its `reqwest` implementation
//! - [`verify`] - `zksolc --version` self-check
//! - [`session`] - The download session state machine
//! - [`registry`] - Process-scoped session holder
//!
//! ## Example
//!
//! ```rust,ignore
//! let settings = DownloaderSettings::from_env()?;
//! let registry = DownloaderRegistry::new(settings, Arc::new(ReqwestDownloader::new()?));
//! let session = registry
//!     .get_or_create(SessionRequest::new("latest", None, "/var/cache/compilers"))
//!     .await?;
//! if !session.is_compiler_downloaded() {
//!     session.download_compiler().await?;
//! }
//! println!("{}", session.binary_path().display());
//! ```

pub mod download;
pub mod errors;
pub mod manifest;
pub mod paths;
pub mod platform;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod verify;

pub use download::{CompilerDownload, ReqwestDownloader};
pub use errors::{DownloaderError, ErrorKind, Result};
pub use manifest::{CompilerVersionInfo, ManifestCache};
pub use paths::CompilerSource;
pub use platform::Platform;
pub use registry::DownloaderRegistry;
pub use resolver::{Advisory, LATEST_ALIAS, Resolution, resolve_version};
pub use session::{CompilerDownloader, SessionRequest, SessionState};
pub use settings::DownloaderSettings;
pub use verify::{Verification, verify_binary};
