//! Control configuration.

use std::time::Duration;

use crate::surface::RowAnimation;

/// Behavior settings for an [`ExpandableList`](crate::ExpandableList).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandableConfig {
    /// Largest row count an expansion still animates.
    /// Bigger sections are inserted with a plain section reload.
    pub max_animated_rows: usize,

    /// How long insert/remove animations run.
    pub animation_duration: Duration,

    /// Hide the list header and footer while there are no rows at all.
    pub only_display_header_and_footer_if_not_empty: bool,

    /// Style for rows inserted by an animated expansion.
    pub insert_animation: RowAnimation,

    /// Style for rows removed by an animated collapse.
    pub delete_animation: RowAnimation,
}

impl Default for ExpandableConfig {
    fn default() -> Self {
        Self {
            max_animated_rows: usize::MAX,
            animation_duration: Duration::from_millis(250),
            only_display_header_and_footer_if_not_empty: false,
            insert_animation: RowAnimation::Top,
            delete_animation: RowAnimation::Top,
        }
    }
}

impl ExpandableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest row count that still animates on expansion.
    pub fn max_animated_rows(mut self, rows: usize) -> Self {
        self.max_animated_rows = rows;
        self
    }

    /// Set the insert/remove animation duration.
    pub fn animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    /// Hide header and footer views while the list is empty.
    pub fn hide_header_and_footer_when_empty(mut self) -> Self {
        self.only_display_header_and_footer_if_not_empty = true;
        self
    }

    /// Set the insert and delete row animation styles.
    pub fn row_animations(mut self, insert: RowAnimation, delete: RowAnimation) -> Self {
        self.insert_animation = insert;
        self.delete_animation = delete;
        self
    }

    /// Whether expanding `row_count` rows may animate.
    pub fn animates_expansion(&self, row_count: usize) -> bool {
        row_count <= self.max_animated_rows
    }
}
