//! The compiler download session.
//!
//! A [`CompilerDownloader`] owns one resolved download target. Construction
//! validates the requested version against the (possibly refreshed) manifest
//! and narrows it to a concrete version. [`CompilerDownloader::download_compiler`]
//! then runs the full acquisition sequence inside a per-session critical
//! section:
//!
//! ```text
//! ManifestResolving -> VersionResolved -> Downloading -> PostProcessing -> Verifying -> Ready
//!          \________________\_________________\_______________\_______________\-> Failed(kind)
//! ```
//!
//! The sequence is never short-circuited by the binary already being on disk;
//! hosts that want to skip a re-download check
//! [`CompilerDownloader::is_compiler_downloaded`] first.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::download::CompilerDownload;
use crate::errors::{DownloaderError, ErrorKind, Result};
use crate::manifest::{CompilerVersionInfo, ManifestCache};
use crate::paths::{self, CompilerSource};
use crate::resolver::resolve_version;
use crate::settings::DownloaderSettings;
use crate::verify::{Verification, verify_binary};

/// Progress of a session through the acquisition sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has run yet.
    Uninitialized,
    /// Reading or fetching the version manifest.
    ManifestResolving,
    /// The requested version has been narrowed to a concrete one.
    VersionResolved,
    /// The binary is being fetched.
    Downloading,
    /// Setting executable permissions.
    PostProcessing,
    /// Running `zksolc --version`.
    Verifying,
    /// The binary is downloaded and verified.
    Ready,
    /// The last step failed with this kind of error.
    Failed(ErrorKind),
}

/// When a cached manifest must be refetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshPolicy {
    /// Fetch when missing or older than the TTL.
    IfStale,
    /// Fetch only when missing.
    IfMissing,
}

/// What a host asks the session for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    /// Requested version, or `"latest"`.
    pub version: String,
    /// Where the binary comes from.
    pub source: CompilerSource,
    /// Root of the compilers directory.
    pub compilers_dir: PathBuf,
}

impl SessionRequest {
    /// Creates a request, classifying `configured_path` as repository, URL or path.
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        configured_path: Option<&str>,
        compilers_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            version: version.into(),
            source: CompilerSource::from_config(configured_path),
            compilers_dir: compilers_dir.into(),
        }
    }
}

/// A download session for one zksolc binary.
pub struct CompilerDownloader {
    version: RwLock<String>,
    source: CompilerSource,
    compilers_dir: PathBuf,
    settings: DownloaderSettings,
    manifest: ManifestCache,
    downloader: Arc<dyn CompilerDownload>,
    state: Mutex<SessionState>,
    critical: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for CompilerDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerDownloader")
            .field("version", &self.version())
            .field("source", &self.source)
            .field("compilers_dir", &self.compilers_dir)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CompilerDownloader {
    /// Creates a session and resolves the requested version.
    ///
    /// The manifest is refetched first if it is missing or older than the
    /// configured TTL.
    ///
    /// # Errors
    ///
    /// Returns the manifest or version errors described on
    /// [`DownloaderError`].
    pub async fn new(
        request: SessionRequest,
        settings: DownloaderSettings,
        downloader: Arc<dyn CompilerDownload>,
    ) -> Result<Self> {
        let session = Self {
            version: RwLock::new(request.version),
            manifest: ManifestCache::new(&request.compilers_dir),
            source: request.source,
            compilers_dir: request.compilers_dir,
            settings,
            downloader,
            state: Mutex::new(SessionState::Uninitialized),
            critical: tokio::sync::Mutex::new(()),
        };

        session
            .track(
                session.resolve(RefreshPolicy::IfStale),
                SessionState::VersionResolved,
            )
            .await?;
        Ok(session)
    }

    /// The resolved version (the requested one until resolution succeeds).
    #[must_use]
    pub fn version(&self) -> String {
        self.version
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Where the binary comes from.
    #[must_use]
    pub fn source(&self) -> &CompilerSource {
        &self.source
    }

    /// Root of the compilers directory.
    #[must_use]
    pub fn compilers_dir(&self) -> &Path {
        &self.compilers_dir
    }

    /// Immutable settings of this session.
    #[must_use]
    pub fn settings(&self) -> &DownloaderSettings {
        &self.settings
    }

    /// Current position in the acquisition sequence.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Path of the binary for the resolved version.
    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        paths::binary_path(
            &self.compilers_dir,
            &self.version(),
            &self.source,
            self.settings.platform,
        )
    }

    /// URL the binary is fetched from.
    #[must_use]
    pub fn download_url(&self) -> String {
        match &self.source {
            CompilerSource::Url(url) => url.clone(),
            CompilerSource::Repository | CompilerSource::Path(_) => {
                self.settings.canonical_binary_url(&self.version())
            }
        }
    }

    /// Returns `true` if a file exists at [`Self::binary_path`].
    #[must_use]
    pub fn is_compiler_downloaded(&self) -> bool {
        self.binary_path().exists()
    }

    /// Downloads, fixes permissions of, and verifies the compiler binary.
    ///
    /// Concurrent callers queue on the session's critical section; each one
    /// re-runs the full sequence after its predecessor finished.
    ///
    /// # Errors
    ///
    /// Any [`DownloaderError`] raised by a step aborts the call and leaves the
    /// session in [`SessionState::Failed`].
    pub async fn download_compiler(&self) -> Result<Verification> {
        let _guard = self.critical.lock().await;
        self.track(self.acquire(), SessionState::Ready).await
    }

    /// Runs the verification step on its own.
    ///
    /// Waits for any download in progress, so it never observes a binary
    /// that is not yet marked executable.
    ///
    /// # Errors
    ///
    /// Returns [`DownloaderError::BinaryCorrupted`] or
    /// [`DownloaderError::VerificationTimeout`].
    pub async fn verify_compiler(&self) -> Result<Verification> {
        let _guard = self.critical.lock().await;
        self.verify_unlocked().await
    }

    /// Verification body; callers must hold the critical section.
    async fn verify_unlocked(&self) -> Result<Verification> {
        let path = self.binary_path();
        let expected = self.version();
        let verification = verify_binary(&path, &expected, self.settings.verify_timeout).await?;
        if let Some(advisory) = &verification.mismatch {
            tracing::warn!(path = %path.display(), "{advisory}");
        }
        Ok(verification)
    }

    async fn acquire(&self) -> Result<Verification> {
        self.resolve(RefreshPolicy::IfMissing).await?;

        self.set_state(SessionState::Downloading);
        let url = self.download_url();
        let path = self.binary_path();
        tracing::info!(version = %self.version(), %url, "downloading zksolc");
        self.downloader
            .download(&url, &path)
            .await
            .map_err(|e| {
                tracing::debug!(%url, error = ?e, "zksolc download failed");
                DownloaderError::binary_download(&url, &e.to_string())
            })?;

        self.set_state(SessionState::PostProcessing);
        set_executable_permissions(&path)?;

        self.set_state(SessionState::Verifying);
        let verification = self.verify_unlocked().await?;
        tracing::info!(path = %path.display(), reported = %verification.reported, "zksolc ready");
        Ok(verification)
    }

    /// Ensures the manifest is available and narrows the version against it.
    async fn resolve(&self, policy: RefreshPolicy) -> Result<()> {
        self.set_state(SessionState::ManifestResolving);
        let info = self.load_manifest(policy).await?;

        let requested = self.version();
        let resolution = resolve_version(&requested, &info)?;
        if let Some(advisory) = &resolution.advisory {
            tracing::warn!("{advisory}");
        }
        tracing::debug!(requested = %requested, resolved = %resolution.version, "version resolved");

        *self.version.write().unwrap_or_else(PoisonError::into_inner) = resolution.version;
        self.set_state(SessionState::VersionResolved);
        Ok(())
    }

    async fn load_manifest(&self, policy: RefreshPolicy) -> Result<CompilerVersionInfo> {
        let refresh = match policy {
            RefreshPolicy::IfStale => self.manifest.is_stale(self.settings.version_info_ttl).await,
            RefreshPolicy::IfMissing => !self.manifest.exists(),
        };
        if refresh {
            self.manifest
                .fetch(self.downloader.as_ref(), &self.settings.version_info_url)
                .await?;
        }

        self.manifest
            .read()
            .await?
            .ok_or_else(|| DownloaderError::manifest_not_found(self.manifest.path().to_path_buf()))
    }

    /// Records the outcome of `step`: `completed` on success, `Failed` otherwise.
    async fn track<T>(
        &self,
        step: impl Future<Output = Result<T>>,
        completed: SessionState,
    ) -> Result<T> {
        let result = step.await;
        match &result {
            Ok(_) => self.set_state(completed),
            Err(e) => self.set_state(SessionState::Failed(e.kind())),
        }
        result
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

/// Sets `0o755` on the downloaded binary.
#[cfg(unix)]
fn set_executable_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| DownloaderError::io(format!("Failed to set permissions: {}", path.display()), e))
}

/// Sets executable permissions (no-op on Windows).
#[cfg(windows)]
#[allow(clippy::unnecessary_wraps)]
fn set_executable_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
