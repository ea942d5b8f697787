//! Logical/physical row remapping.
//!
//! Every expandable section gets a synthetic trigger row at physical row 0.
//! The proxy answers the surface's row queries in physical space while the
//! datasource keeps thinking in logical rows.

use crate::datasource::{ExpandableDataSource, ExpandingCell};
use crate::store::SectionStateStore;
use crate::surface::{ListSurface, RowIndex};

/// Content of a physical row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRow<R, T> {
    /// The trigger cell, configured for the section's current state.
    Trigger(T),
    /// A datasource row.
    Row(R),
}

impl<R, T> ProxyRow<R, T> {
    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::Trigger(_))
    }

    pub fn as_row(&self) -> Option<&R> {
        match self {
            Self::Row(row) => Some(row),
            Self::Trigger(_) => None,
        }
    }
}

/// Where a selection of a physical row goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelection {
    /// The trigger row was hit; toggle the section.
    Toggle(usize),
    /// Forward to the delegate at this logical index.
    Forward(RowIndex),
}

/// Remaps row queries against the current section states.
///
/// The store is borrowed mutably only so unresolved `expandable` flags can
/// be memoized; the proxy never changes a section's state.
pub struct ListProxy<'a, D: ?Sized> {
    store: &'a mut SectionStateStore,
    data: &'a D,
}

impl<'a, D> ListProxy<'a, D>
where
    D: ExpandableDataSource + ?Sized,
{
    pub fn new(store: &'a mut SectionStateStore, data: &'a D) -> Self {
        Self { store, data }
    }

    pub fn number_of_sections(&self) -> usize {
        self.data.section_count()
    }

    /// Physical row count of a section.
    pub fn number_of_rows(&mut self, section: usize) -> usize {
        if !self.store.is_expandable(section, self.data) {
            return self.data.row_count(section);
        }
        let logical = if self.store.is_expanded(section) {
            self.data.row_count(section)
        } else {
            0
        };
        1 + logical
    }

    /// Physical row count across all sections.
    pub fn total_row_count(&mut self) -> usize {
        (0..self.number_of_sections())
            .map(|section| self.number_of_rows(section))
            .sum()
    }

    /// Map a physical index to its logical index.
    ///
    /// Returns `None` for trigger rows.
    pub fn logical_index(&mut self, index: RowIndex) -> Option<RowIndex> {
        if !self.store.is_expandable(index.section, self.data) {
            return Some(index);
        }
        index
            .row
            .checked_sub(1)
            .map(|row| RowIndex::new(index.section, row))
    }

    /// Map a logical index to the physical row it renders at.
    pub fn physical_index(&mut self, index: RowIndex) -> RowIndex {
        if self.store.is_expandable(index.section, self.data) {
            RowIndex::new(index.section, index.row + 1)
        } else {
            index
        }
    }

    /// Content of a physical row, or `None` if it is out of range.
    pub fn row_at(&mut self, index: RowIndex) -> Option<ProxyRow<D::Row, D::Trigger>> {
        if index.row >= self.number_of_rows(index.section) {
            return None;
        }
        match self.logical_index(index) {
            Some(logical) => Some(ProxyRow::Row(self.data.row(logical.section, logical.row))),
            None => Some(ProxyRow::Trigger(self.trigger_cell(index.section))),
        }
    }

    /// Trigger cell configured with the section's loading and expansion state.
    pub fn trigger_cell(&mut self, section: usize) -> D::Trigger {
        let mut cell = self.data.trigger_cell(section);
        let state = self.store.get(section).cloned().unwrap_or_default();
        cell.set_loading(state.is_downloading());
        cell.set_expansion_style(state.expansion_style(), false);
        cell
    }

    /// Decide where a selection at a physical row goes.
    pub fn route_selection(&mut self, index: RowIndex) -> RowSelection {
        match self.logical_index(index) {
            Some(logical) => RowSelection::Forward(logical),
            None => RowSelection::Toggle(index.section),
        }
    }
}

/// Header/footer views stashed while the list is empty.
#[derive(Debug)]
pub struct HeaderFooterStash<V> {
    header: Option<V>,
    footer: Option<V>,
    hidden: bool,
}

impl<V> Default for HeaderFooterStash<V> {
    fn default() -> Self {
        Self {
            header: None,
            footer: None,
            hidden: false,
        }
    }
}

impl<V> HeaderFooterStash<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the views are currently stashed away.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Hide or restore the surface's header/footer for `total_rows`.
    ///
    /// With `enabled` off, stashed views are always restored.
    pub fn apply<S>(&mut self, surface: &S, enabled: bool, total_rows: usize)
    where
        S: ListSurface<View = V> + ?Sized,
    {
        let should_hide = enabled && total_rows == 0;
        if should_hide && !self.hidden {
            log::debug!("List empty, hiding header and footer");
            self.header = surface.header_view();
            self.footer = surface.footer_view();
            surface.set_header_view(None);
            surface.set_footer_view(None);
            self.hidden = true;
        } else if !should_hide && self.hidden {
            log::debug!("Restoring header and footer");
            surface.set_header_view(self.header.take());
            surface.set_footer_view(self.footer.take());
            self.hidden = false;
        }
    }
}
