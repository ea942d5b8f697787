//! Section state store.
//!
//! Single source of truth for every section's lifecycle flags. Records are
//! created on first access and only ever removed all at once by
//! [`SectionStateStore::reset_all`].

use std::collections::BTreeMap;

use crate::datasource::ExpandableDataSource;
use crate::section::{Section, SectionPhase};

/// Per-section flags keyed by section index.
#[derive(Debug, Default)]
pub struct SectionStateStore {
    sections: BTreeMap<usize, Section>,
    /// Bumped on every reset; download tokens carry it.
    generation: u64,
}

impl SectionStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current data-load generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record for a section, if it has been touched this generation.
    pub fn get(&self, section: usize) -> Option<&Section> {
        self.sections.get(&section)
    }

    pub(crate) fn entry_mut(&mut self, section: usize) -> &mut Section {
        self.sections.entry(section).or_default()
    }

    /// Iterate over every section record created this generation.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Section)> {
        self.sections.iter().map(|(index, section)| (*index, section))
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    /// Whether a section is expandable, asking the datasource on first use.
    pub fn is_expandable<D>(&mut self, section: usize, data: &D) -> bool
    where
        D: ExpandableDataSource + ?Sized,
    {
        let entry = self.entry_mut(section);
        match entry.expandable {
            Some(expandable) => expandable,
            None => {
                let expandable = data.can_expand_section(section);
                log::trace!("Section {} resolved expandable={}", section, expandable);
                entry.expandable = Some(expandable);
                expandable
            }
        }
    }

    /// Cached expandable flag without consulting the datasource.
    pub fn cached_expandable(&self, section: usize) -> Option<bool> {
        self.get(section).and_then(|s| s.expandable)
    }

    pub fn is_expanded(&self, section: usize) -> bool {
        self.get(section).is_some_and(Section::is_expanded)
    }

    pub fn is_downloading(&self, section: usize) -> bool {
        self.get(section).is_some_and(Section::is_downloading)
    }

    pub fn is_animating(&self, section: usize) -> bool {
        self.get(section).is_some_and(Section::is_animating)
    }

    pub fn phase(&self, section: usize) -> SectionPhase {
        self.get(section)
            .map(Section::phase)
            .unwrap_or(SectionPhase::Collapsed)
    }

    // -------------------------------------------------------------------------
    // Write methods
    // -------------------------------------------------------------------------

    pub fn set_expanded(&mut self, section: usize, expanded: bool) {
        self.set_flag(section, expanded, |s| &mut s.expanded);
    }

    pub fn set_downloading(&mut self, section: usize, downloading: bool) {
        self.set_flag(section, downloading, |s| &mut s.downloading);
    }

    pub fn set_animating(&mut self, section: usize, animating: bool) {
        self.set_flag(section, animating, |s| &mut s.animating);
    }

    /// Non-expandable sections never get a flag raised.
    fn set_flag(&mut self, section: usize, value: bool, flag: impl FnOnce(&mut Section) -> &mut bool) {
        let entry = self.entry_mut(section);
        if value && entry.expandable == Some(false) {
            log::warn!("Refusing to raise a flag on non-expandable section {}", section);
            return;
        }
        *flag(entry) = value;
    }

    /// Drop every record and start a new data generation.
    ///
    /// Returns the records that existed so the caller can cancel what they
    /// were waiting on.
    pub fn reset_all(&mut self) -> Vec<(usize, Section)> {
        self.generation += 1;
        log::debug!("Section states reset (generation {})", self.generation);
        std::mem::take(&mut self.sections).into_iter().collect()
    }
}
