//! Error types for section transitions and section downloads.

use thiserror::Error;

/// Why a transition request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidStateReason {
    /// The datasource does not allow this section to expand.
    NotExpandable,
    /// The section is already expanded.
    AlreadyExpanded,
    /// The section is not expanded.
    NotExpanded,
    /// An insert/remove animation for the section is still running.
    Animating,
    /// The section is waiting for its data.
    Downloading,
    /// The section has no outstanding download.
    NotDownloading,
}

impl std::fmt::Display for InvalidStateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NotExpandable => "section is not expandable",
            Self::AlreadyExpanded => "section is already expanded",
            Self::NotExpanded => "section is not expanded",
            Self::Animating => "section is animating",
            Self::Downloading => "section is downloading",
            Self::NotDownloading => "section is not downloading",
        };
        f.write_str(text)
    }
}

/// Errors returned by expand/collapse/cancel requests.
///
/// A rejected request never changes any section state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    /// The section is not in a state that allows the requested transition.
    #[error("Section {section}: {reason}")]
    InvalidState {
        /// Section the request targeted.
        section: usize,
        /// Why the request was rejected.
        reason: InvalidStateReason,
    },

    /// The datasource was dropped; the control does not own it.
    #[error("Datasource is no longer attached")]
    DataSourceDetached,

    /// A collaborator panicked while the state lock was held.
    #[error("Expansion state lock poisoned")]
    Poisoned,
}

impl ExpansionError {
    pub(crate) fn invalid(section: usize, reason: InvalidStateReason) -> Self {
        Self::InvalidState { section, reason }
    }

    /// The rejection reason, if this is an invalid-state error.
    pub fn reason(&self) -> Option<InvalidStateReason> {
        match self {
            Self::InvalidState { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Check if this is an invalid-state error.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

/// Error reported by the host when a section download fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DownloadError {
    /// Error message
    pub message: String,
}

impl DownloadError {
    /// Create a new download error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<String> for DownloadError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for DownloadError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// What happened to a download completion or failure callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The callback matched the outstanding download and was applied.
    Applied,
    /// The callback was stale (cancelled, reset or superseded) and dropped.
    Ignored,
}

impl CallbackOutcome {
    /// Check if the callback was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
