//! Composition root: turns CLI arguments into a live download session.
//!
//! Settings are layered as defaults, then `ZKSOLC_*` environment variables,
//! then command-line flags.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use zksolc_downloader::{
    CompilerDownloader, DownloaderRegistry, DownloaderSettings, ReqwestDownloader, SessionRequest,
};

/// Environment variable overriding the compilers directory.
pub const COMPILERS_DIR_ENV: &str = "ZKSOLC_COMPILERS_DIR";

/// Arguments shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Compiler version (e.g., "1.3.13" or "latest").
    #[clap(default_value = "latest")]
    pub version: String,

    /// Custom download URL for the binary, or a local path.
    #[clap(long = "compiler-path")]
    pub compiler_path: Option<String>,

    /// Directory holding downloaded compilers.
    #[clap(long = "compilers-dir")]
    pub compilers_dir: Option<PathBuf>,

    /// Manifest cache period in seconds.
    #[clap(long = "ttl")]
    pub ttl_secs: Option<u64>,

    /// Timeout in seconds for `zksolc --version`.
    #[clap(long = "verify-timeout")]
    pub verify_timeout_secs: Option<u64>,
}

impl SessionArgs {
    /// Resolves the compilers directory.
    ///
    /// Order: `--compilers-dir`, `ZKSOLC_COMPILERS_DIR`, then the user cache dir.
    ///
    /// # Errors
    ///
    /// Returns an error if no cache directory can be determined.
    pub fn compilers_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.compilers_dir {
            return Ok(dir.clone());
        }
        if let Some(dir) = std::env::var(COMPILERS_DIR_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            return Ok(PathBuf::from(dir));
        }
        Ok(dirs::cache_dir()
            .context("Cannot determine cache directory. Set ZKSOLC_COMPILERS_DIR environment variable.")?
            .join("zksolc-fetch")
            .join("compilers"))
    }

    fn settings(&self) -> Result<DownloaderSettings> {
        let mut settings = DownloaderSettings::from_env()?;
        if let Some(ttl) = self.ttl_secs {
            settings.version_info_ttl = Duration::from_secs(ttl);
        }
        if let Some(timeout) = self.verify_timeout_secs {
            settings.verify_timeout = Some(Duration::from_secs(timeout));
        }
        Ok(settings)
    }

    /// Builds the registry and obtains the session for these arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if settings, the transport, or session construction fail.
    pub async fn open_session(&self) -> Result<Arc<CompilerDownloader>> {
        let registry = DownloaderRegistry::new(
            self.settings()?,
            Arc::new(ReqwestDownloader::new()?),
        );
        let request = SessionRequest::new(
            &self.version,
            self.compiler_path.as_deref(),
            self.compilers_dir()?,
        );
        tracing::debug!(
            version = %self.version,
            compilers_dir = %request.compilers_dir.display(),
            source = %request.source,
            "opening zksolc session"
        );
        registry
            .get_or_create(request)
            .await
            .with_context(|| format!("Failed to resolve zksolc version '{}'", self.version))
    }
}
