//! The list-rendering collaborator and the row addressing it uses.

use crate::section::ExpansionStyle;

/// A physical or logical row address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowIndex {
    pub section: usize,
    pub row: usize,
}

impl RowIndex {
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl std::fmt::Display for RowIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.section, self.row)
    }
}

/// Animation style for batch row mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowAnimation {
    /// Apply the mutation immediately.
    None,
    /// Cross-fade rows in or out.
    Fade,
    /// Slide rows from/to the top edge.
    #[default]
    Top,
    /// Slide rows from/to the bottom edge.
    Bottom,
    /// Let the surface pick.
    Automatic,
}

impl RowAnimation {
    /// Check if this style moves anything on screen.
    pub fn is_animated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// The scrollable list engine that owns the control.
///
/// Row indices passed to these methods are physical: row 0 of an
/// expandable section is its trigger row. The surface reads row counts and
/// row content back through [`ExpandableList`](crate::ExpandableList)
/// after each command.
pub trait ListSurface {
    /// Header/footer view handle.
    type View;

    fn insert_rows(&self, rows: &[RowIndex], animation: RowAnimation);

    fn delete_rows(&self, rows: &[RowIndex], animation: RowAnimation);

    fn reload_rows(&self, rows: &[RowIndex], animation: RowAnimation);

    fn reload_section(&self, section: usize, animation: RowAnimation);

    /// Throw away everything and re-query all sections.
    fn reload_data(&self);

    /// Push new loading/expansion state to the visible trigger cell.
    ///
    /// The default re-fetches the trigger row, which hands out a freshly
    /// configured cell.
    fn update_trigger(&self, section: usize, style: ExpansionStyle, loading: bool, animated: bool) {
        let _ = (style, loading, animated);
        self.reload_rows(&[RowIndex::new(section, 0)], RowAnimation::None);
    }

    fn header_view(&self) -> Option<Self::View>;

    fn set_header_view(&self, view: Option<Self::View>);

    fn footer_view(&self) -> Option<Self::View>;

    fn set_footer_view(&self, view: Option<Self::View>);
}
