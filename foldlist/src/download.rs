//! Download bookkeeping.
//!
//! At most one download is outstanding per section. Each request is tagged
//! with a [`DownloadToken`]; completions and failures are matched against the
//! section's outstanding token, so a callback that arrives after a cancel or
//! reset finds nothing to match and is dropped.

use crate::section::PendingDownload;
use crate::store::SectionStateStore;

/// Identifies one download request.
///
/// Hand it to the loader and pass it back on completion or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DownloadToken {
    section: usize,
    generation: u64,
    serial: u64,
}

impl DownloadToken {
    /// Section the download is for.
    pub fn section(&self) -> usize {
        self.section
    }

    /// Data generation the request was issued in.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Display for DownloadToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "download(section {}, gen {}, #{})",
            self.section, self.generation, self.serial
        )
    }
}

/// Tracks outstanding section downloads.
///
/// The coordinator only does bookkeeping. Starting and cancelling the
/// actual load is left to the caller, which receives the token to hand to
/// the delegate.
#[derive(Debug, Default)]
pub struct DownloadCoordinator {
    next_serial: u64,
}

impl DownloadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a section downloading and mint a token for it.
    ///
    /// Returns `None` if the section already has a download outstanding; the
    /// caller must then not trigger another load.
    pub fn request_download(
        &mut self,
        store: &mut SectionStateStore,
        section: usize,
        animated: bool,
    ) -> Option<DownloadToken> {
        if store.is_downloading(section) {
            log::debug!("Section {} already downloading", section);
            return None;
        }
        self.next_serial += 1;
        let token = DownloadToken {
            section,
            generation: store.generation(),
            serial: self.next_serial,
        };
        store.set_downloading(section, true);
        let entry = store.entry_mut(section);
        if !entry.downloading {
            // Store refused the flag (non-expandable section).
            return None;
        }
        entry.pending = Some(PendingDownload { token, animated });
        log::debug!("Requested {}", token);
        Some(token)
    }

    /// Clear a section's download and return the token to cancel.
    ///
    /// The flag is cleared immediately whether or not the loader honors the
    /// cancellation. Returns `None` if nothing was outstanding.
    pub fn cancel_download(
        &mut self,
        store: &mut SectionStateStore,
        section: usize,
    ) -> Option<DownloadToken> {
        if !store.is_downloading(section) {
            return None;
        }
        let entry = store.entry_mut(section);
        entry.downloading = false;
        let token = entry.pending.take().map(|p| p.token);
        if let Some(token) = token {
            log::debug!("Cancelled {}", token);
        }
        token
    }

    /// Settle the download `token` refers to.
    ///
    /// Returns the settled request if `token` is the section's outstanding
    /// one, `None` if it is stale.
    pub(crate) fn settle(
        &mut self,
        store: &mut SectionStateStore,
        token: DownloadToken,
    ) -> Option<PendingDownload> {
        if token.generation != store.generation() {
            log::debug!("Ignoring {} from generation {}", token, token.generation);
            return None;
        }
        let matched = store
            .get(token.section)
            .and_then(|entry| entry.pending.filter(|p| entry.downloading && p.token == token));
        let Some(pending) = matched else {
            log::debug!("Ignoring stale {}", token);
            return None;
        };
        let entry = store.entry_mut(token.section);
        entry.downloading = false;
        entry.pending = None;
        Some(pending)
    }

    /// Settle a completed download.
    ///
    /// Clears the downloading flag. Returns whether the completion matched
    /// the outstanding request; on `true` the caller proceeds to expansion.
    pub fn complete_download(&mut self, store: &mut SectionStateStore, token: DownloadToken) -> bool {
        self.settle(store, token).is_some()
    }
}
