//! Per-section expansion record.

use crate::download::DownloadToken;

/// Collapsed vs expanded designation of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpansionStyle {
    /// Only the trigger row is shown.
    #[default]
    Collapsed,
    /// The trigger row and every logical row are shown.
    Expanded,
}

impl ExpansionStyle {
    /// Check if this is the expanded style.
    pub fn is_expanded(&self) -> bool {
        matches!(self, Self::Expanded)
    }
}

/// Where a section is in its expansion lifecycle.
///
/// ```text
/// Collapsed ──expand──▶ AwaitingData ──complete──▶ Expanded
///     ▲  └─────────expand (no download)──────────▶   │
///     │                                               │
///     └──────────── Collapsing ◀───────collapse───────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionPhase {
    /// No rows beyond the trigger row are rendered.
    Collapsed,
    /// The trigger row shows a loading indicator until the data arrives.
    AwaitingData,
    /// All logical rows are rendered beneath the trigger row.
    Expanded,
    /// The removal animation is running.
    Collapsing,
}

/// Download that a section is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingDownload {
    pub token: DownloadToken,
    /// Whether the expansion that requested it wants animation.
    pub animated: bool,
}

/// The four lifecycle flags of one section, kept in a single record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// `None` until the datasource has been asked.
    pub(crate) expandable: Option<bool>,
    pub(crate) expanded: bool,
    pub(crate) downloading: bool,
    pub(crate) animating: bool,
    pub(crate) pending: Option<PendingDownload>,
}

impl Section {
    /// Whether `expandable` has been resolved for this data generation.
    pub fn is_resolved(&self) -> bool {
        self.expandable.is_some()
    }

    /// Unresolved sections report false.
    pub fn is_expandable(&self) -> bool {
        self.expandable.unwrap_or(false)
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Token of the outstanding download, if any.
    pub fn outstanding_download(&self) -> Option<DownloadToken> {
        self.pending.map(|p| p.token)
    }

    pub fn expansion_style(&self) -> ExpansionStyle {
        if self.expanded {
            ExpansionStyle::Expanded
        } else {
            ExpansionStyle::Collapsed
        }
    }

    /// Derive the lifecycle phase from the flags.
    pub fn phase(&self) -> SectionPhase {
        if self.downloading {
            SectionPhase::AwaitingData
        } else if self.expanded {
            SectionPhase::Expanded
        } else if self.animating {
            SectionPhase::Collapsing
        } else {
            SectionPhase::Collapsed
        }
    }
}
