//! Application-side collaborators: the datasource and the delegate.

use crate::download::DownloadToken;
use crate::error::DownloadError;
use crate::section::ExpansionStyle;
use crate::surface::RowIndex;

/// Capability the trigger cell of an expandable section must offer.
///
/// The control configures every trigger cell it hands out, so the cell
/// only needs to render what it is told.
pub trait ExpandingCell {
    /// Show or hide the loading affordance (spinner).
    fn set_loading(&mut self, loading: bool);

    /// Show the disclosure state for the section.
    fn set_expansion_style(&mut self, style: ExpansionStyle, animated: bool);
}

/// Supplies sections, rows and expansion capabilities.
///
/// All row indices here are logical: they never count the trigger row.
///
/// Implementations must not call back into the [`ExpandableList`](crate::ExpandableList)
/// from these methods; they are queried while the section state is locked.
///
/// # Example
///
/// ```ignore
/// impl ExpandableDataSource for Repos {
///     type Row = String;
///     type Trigger = HeaderCell;
///
///     fn section_count(&self) -> usize { self.groups.len() }
///     fn row_count(&self, section: usize) -> usize { self.groups[section].repos.len() }
///     fn row(&self, section: usize, row: usize) -> String { self.groups[section].repos[row].clone() }
///     fn can_expand_section(&self, _section: usize) -> bool { true }
///     fn needs_download(&self, section: usize) -> bool { !self.groups[section].loaded }
///     fn trigger_cell(&self, section: usize) -> HeaderCell { HeaderCell::new(&self.groups[section].name) }
/// }
/// ```
pub trait ExpandableDataSource {
    /// Content of a logical row.
    type Row;
    /// Cell used for the trigger row.
    type Trigger: ExpandingCell;

    fn section_count(&self) -> usize;

    /// Number of logical rows in a section.
    fn row_count(&self, section: usize) -> usize;

    fn row(&self, section: usize, row: usize) -> Self::Row;

    /// Asked once per section per data generation; the answer is cached.
    fn can_expand_section(&self, section: usize) -> bool;

    /// Whether expanding must first fetch the section's rows.
    fn needs_download(&self, section: usize) -> bool;

    fn trigger_cell(&self, section: usize) -> Self::Trigger;

    /// Expansion state to apply when all states are reset.
    fn preferred_expansion(&self, section: usize) -> Option<ExpansionStyle> {
        let _ = section;
        None
    }
}

/// Receives download requests and lifecycle notifications.
///
/// Notifications are delivered after the section state has been updated and
/// the state lock released, so a delegate may call back into the list.
pub trait ExpandableDelegate {
    /// Start fetching a section's rows.
    ///
    /// Must eventually call [`ExpandableList::complete_download`](crate::ExpandableList::complete_download)
    /// or [`ExpandableList::fail_download`](crate::ExpandableList::fail_download) with `token`,
    /// unless the download is cancelled first.
    fn download_data(&self, section: usize, token: DownloadToken);

    /// Best-effort cancellation of an outstanding download.
    fn cancel_download(&self, token: DownloadToken) {
        let _ = token;
    }

    fn will_expand(&self, section: usize) {
        let _ = section;
    }

    fn did_expand(&self, section: usize) {
        let _ = section;
    }

    fn will_collapse(&self, section: usize) {
        let _ = section;
    }

    fn did_collapse(&self, section: usize) {
        let _ = section;
    }

    fn download_failed(&self, section: usize, error: &DownloadError) {
        let _ = (section, error);
    }

    /// A physical row was just inserted by an animated expansion.
    fn will_display_row_while_animating(&self, index: RowIndex) {
        let _ = index;
    }

    /// A non-trigger row was selected. `index` is logical.
    fn did_select_row(&self, index: RowIndex) {
        let _ = index;
    }
}
