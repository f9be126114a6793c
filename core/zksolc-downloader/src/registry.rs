//! Process-scoped holder of the download session.
//!
//! The host's composition root owns one [`DownloaderRegistry`] and hands it
//! (or the sessions it returns) to every call site. The first
//! [`DownloaderRegistry::get_or_create`] builds the session; later calls return
//! the same `Arc` regardless of their arguments. Replacing the session is only
//! possible through [`DownloaderRegistry::reinitialize`].
//!
//! Construction itself is not serialized: two tasks racing on an empty registry
//! may both build a session, and the one stored first wins.

use std::sync::{Arc, Mutex, PoisonError};

use crate::download::CompilerDownload;
use crate::errors::Result;
use crate::session::{CompilerDownloader, SessionRequest};
use crate::settings::DownloaderSettings;

/// Holder of the per-process [`CompilerDownloader`].
pub struct DownloaderRegistry {
    settings: DownloaderSettings,
    downloader: Arc<dyn CompilerDownload>,
    slot: Mutex<Option<Arc<CompilerDownloader>>>,
}

impl DownloaderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(settings: DownloaderSettings, downloader: Arc<dyn CompilerDownload>) -> Self {
        Self {
            settings,
            downloader,
            slot: Mutex::new(None),
        }
    }

    /// Returns the held session, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<CompilerDownloader>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the held session or constructs one for `request`.
    ///
    /// # Errors
    ///
    /// Propagates construction errors; the registry stays empty in that case.
    pub async fn get_or_create(&self, request: SessionRequest) -> Result<Arc<CompilerDownloader>> {
        if let Some(existing) = self.current() {
            if existing.source() != &request.source
                || existing.compilers_dir() != request.compilers_dir
            {
                tracing::debug!(
                    requested_source = %request.source,
                    held_source = %existing.source(),
                    "returning existing zksolc session; call reinitialize to replace it"
                );
            }
            return Ok(existing);
        }

        let created = Arc::new(self.build(request).await?);
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(slot.get_or_insert(created)))
    }

    /// Builds a new session for `request` and replaces the held one.
    ///
    /// On failure the previous session is kept.
    ///
    /// # Errors
    ///
    /// Propagates construction errors.
    pub async fn reinitialize(&self, request: SessionRequest) -> Result<Arc<CompilerDownloader>> {
        let created = Arc::new(self.build(request).await?);
        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::clone(&created));
        if let Some(previous) = previous {
            tracing::info!(
                previous = %previous.version(),
                current = %created.version(),
                "zksolc session reinitialized"
            );
        }
        Ok(created)
    }

    async fn build(&self, request: SessionRequest) -> Result<CompilerDownloader> {
        CompilerDownloader::new(request, self.settings.clone(), Arc::clone(&self.downloader)).await
    }
}
