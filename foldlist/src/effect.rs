//! Side effects produced by section transitions.
//!
//! The controller never calls a collaborator itself. It returns the ordered
//! effects of a transition and [`ExpandableList`](crate::ExpandableList)
//! executes them after releasing the state lock.

use crate::download::DownloadToken;
use crate::error::DownloadError;
use crate::section::ExpansionStyle;
use crate::surface::{RowAnimation, RowIndex};

/// Delegate notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    WillExpand(usize),
    DidExpand(usize),
    WillCollapse(usize),
    DidCollapse(usize),
    DownloadFailed(usize, DownloadError),
    /// Physical row inserted by an animated expansion.
    WillDisplayWhileAnimating(RowIndex),
}

/// Command for the list surface. Indices are physical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCommand {
    InsertRows {
        rows: Vec<RowIndex>,
        animation: RowAnimation,
    },
    DeleteRows {
        rows: Vec<RowIndex>,
        animation: RowAnimation,
    },
    ReloadSection {
        section: usize,
        animation: RowAnimation,
    },
    ReloadData,
    UpdateTrigger {
        section: usize,
        style: ExpansionStyle,
        loading: bool,
        animated: bool,
    },
}

/// One step of a transition, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Notify(Notification),
    Surface(SurfaceCommand),
    StartDownload(DownloadToken),
    CancelDownload(DownloadToken),
    /// Re-evaluate header/footer visibility against the new row count.
    RefreshHeaderFooter,
}

impl Effect {
    /// Check if this effect changes what the surface shows.
    pub fn touches_surface(&self) -> bool {
        matches!(self, Self::Surface(_) | Self::RefreshHeaderFooter)
    }
}
