//! Section expansion state machine.
//!
//! Every operation validates against the section's current flags, updates
//! the [`SectionStateStore`], and returns the ordered [`Effect`]s the caller
//! must execute. A rejected request returns an error and leaves all state
//! untouched.

use std::time::Instant;

use crate::animation::{AnimationSchedule, SectionAnimation, TransitionKind};
use crate::config::ExpandableConfig;
use crate::datasource::ExpandableDataSource;
use crate::download::{DownloadCoordinator, DownloadToken};
use crate::effect::{Effect, Notification, SurfaceCommand};
use crate::error::{CallbackOutcome, DownloadError, ExpansionError, InvalidStateReason};
use crate::section::{ExpansionStyle, SectionPhase};
use crate::store::SectionStateStore;
use crate::surface::{RowAnimation, RowIndex};

type Effects = Vec<Effect>;

/// Orchestrates expand/collapse transitions for every section.
#[derive(Debug, Default)]
pub struct ExpansionController {
    store: SectionStateStore,
    downloads: DownloadCoordinator,
    animations: AnimationSchedule,
    config: ExpandableConfig,
}

impl ExpansionController {
    pub fn new(config: ExpandableConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ExpandableConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ExpandableConfig) {
        self.config = config;
    }

    pub fn store(&self) -> &SectionStateStore {
        &self.store
    }

    /// Mutable store access for lazy `expandable` resolution.
    pub fn store_mut(&mut self) -> &mut SectionStateStore {
        &mut self.store
    }

    pub fn animations(&self) -> &AnimationSchedule {
        &self.animations
    }

    pub fn can_expand_section<D>(&mut self, data: &D, section: usize) -> bool
    where
        D: ExpandableDataSource + ?Sized,
    {
        self.store.is_expandable(section, data)
    }

    pub fn is_section_expanded(&self, section: usize) -> bool {
        self.store.is_expanded(section)
    }

    pub fn phase(&self, section: usize) -> SectionPhase {
        self.store.phase(section)
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Expand a section, going through `AwaitingData` if it needs a download.
    pub fn expand_section<D>(
        &mut self,
        data: &D,
        section: usize,
        animated: bool,
        now: Instant,
    ) -> Result<Effects, ExpansionError>
    where
        D: ExpandableDataSource + ?Sized,
    {
        if !self.store.is_expandable(section, data) {
            return Err(ExpansionError::invalid(section, InvalidStateReason::NotExpandable));
        }
        if self.store.is_animating(section) {
            return Err(ExpansionError::invalid(section, InvalidStateReason::Animating));
        }
        if self.store.is_downloading(section) {
            return Err(ExpansionError::invalid(section, InvalidStateReason::Downloading));
        }
        if self.store.is_expanded(section) {
            return Err(ExpansionError::invalid(section, InvalidStateReason::AlreadyExpanded));
        }

        let mut effects = Effects::new();
        if data.needs_download(section) {
            let Some(token) = self.downloads.request_download(&mut self.store, section, animated)
            else {
                return Err(ExpansionError::invalid(section, InvalidStateReason::Downloading));
            };
            log::debug!("Section {} awaiting data", section);
            effects.push(Effect::Notify(Notification::WillExpand(section)));
            effects.push(Effect::Surface(SurfaceCommand::UpdateTrigger {
                section,
                style: ExpansionStyle::Collapsed,
                loading: true,
                animated: false,
            }));
            effects.push(Effect::StartDownload(token));
        } else {
            effects.push(Effect::Notify(Notification::WillExpand(section)));
            self.begin_expansion(data, section, animated, now, &mut effects);
        }
        Ok(effects)
    }

    /// Mark a section expanded and insert its rows.
    fn begin_expansion<D>(
        &mut self,
        data: &D,
        section: usize,
        animated: bool,
        now: Instant,
        effects: &mut Effects,
    ) where
        D: ExpandableDataSource + ?Sized,
    {
        let count = data.row_count(section);
        let animate = animated && count > 0 && self.config.animates_expansion(count);
        log::debug!(
            "Expanding section {} ({} rows, animated={})",
            section,
            count,
            animate
        );

        self.store.set_downloading(section, false);
        self.store.set_expanded(section, true);
        self.store.set_animating(section, animate);

        effects.push(Effect::Surface(SurfaceCommand::UpdateTrigger {
            section,
            style: ExpansionStyle::Expanded,
            loading: false,
            animated: animate,
        }));

        if animate {
            let rows = physical_rows(section, count);
            effects.push(Effect::Surface(SurfaceCommand::InsertRows {
                rows: rows.clone(),
                animation: self.config.insert_animation,
            }));
            effects.extend(
                rows.into_iter()
                    .map(|row| Effect::Notify(Notification::WillDisplayWhileAnimating(row))),
            );
            self.animations.start(SectionAnimation::new(
                section,
                TransitionKind::Expand,
                self.config.animation_duration,
                now,
            ));
        } else {
            effects.push(Effect::Surface(SurfaceCommand::ReloadSection {
                section,
                animation: RowAnimation::None,
            }));
            effects.push(Effect::Notify(Notification::DidExpand(section)));
        }
        effects.push(Effect::RefreshHeaderFooter);
    }

    /// Collapse an expanded section.
    ///
    /// A section still awaiting its data has its download cancelled instead.
    pub fn collapse_section<D>(
        &mut self,
        data: &D,
        section: usize,
        animated: bool,
        now: Instant,
    ) -> Result<Effects, ExpansionError>
    where
        D: ExpandableDataSource + ?Sized,
    {
        if !self.store.is_expandable(section, data) {
            return Err(ExpansionError::invalid(section, InvalidStateReason::NotExpandable));
        }
        if self.store.is_animating(section) {
            return Err(ExpansionError::invalid(section, InvalidStateReason::Animating));
        }
        if self.store.is_downloading(section) {
            return self.cancel_download(section);
        }
        if !self.store.is_expanded(section) {
            return Err(ExpansionError::invalid(section, InvalidStateReason::NotExpanded));
        }

        let count = data.row_count(section);
        let animate = animated && count > 0;
        log::debug!(
            "Collapsing section {} ({} rows, animated={})",
            section,
            count,
            animate
        );

        let mut effects = vec![Effect::Notify(Notification::WillCollapse(section))];
        self.store.set_expanded(section, false);
        self.store.set_animating(section, animate);

        effects.push(Effect::Surface(SurfaceCommand::UpdateTrigger {
            section,
            style: ExpansionStyle::Collapsed,
            loading: false,
            animated: animate,
        }));
        if count > 0 {
            effects.push(Effect::Surface(SurfaceCommand::DeleteRows {
                rows: physical_rows(section, count),
                animation: if animate {
                    self.config.delete_animation
                } else {
                    RowAnimation::None
                },
            }));
        }
        if animate {
            self.animations.start(SectionAnimation::new(
                section,
                TransitionKind::Collapse,
                self.config.animation_duration,
                now,
            ));
        } else {
            effects.push(Effect::Notify(Notification::DidCollapse(section)));
        }
        effects.push(Effect::RefreshHeaderFooter);
        Ok(effects)
    }

    /// Expand or collapse depending on the current state, animated.
    ///
    /// A section awaiting data has its download cancelled.
    pub fn toggle_section<D>(
        &mut self,
        data: &D,
        section: usize,
        now: Instant,
    ) -> Result<Effects, ExpansionError>
    where
        D: ExpandableDataSource + ?Sized,
    {
        match self.store.phase(section) {
            SectionPhase::AwaitingData => self.cancel_download(section),
            SectionPhase::Expanded => self.collapse_section(data, section, true, now),
            SectionPhase::Collapsed | SectionPhase::Collapsing => {
                self.expand_section(data, section, true, now)
            }
        }
    }

    /// Abandon a section's outstanding download and return it to `Collapsed`.
    pub fn cancel_download(&mut self, section: usize) -> Result<Effects, ExpansionError> {
        let Some(token) = self.downloads.cancel_download(&mut self.store, section) else {
            return Err(ExpansionError::invalid(section, InvalidStateReason::NotDownloading));
        };
        Ok(vec![
            Effect::CancelDownload(token),
            Effect::Surface(SurfaceCommand::UpdateTrigger {
                section,
                style: ExpansionStyle::Collapsed,
                loading: false,
                animated: false,
            }),
        ])
    }

    // -------------------------------------------------------------------------
    // Callbacks
    // -------------------------------------------------------------------------

    /// Handle a finished download: expand the section if it still waits.
    pub fn complete_download<D>(
        &mut self,
        data: &D,
        token: DownloadToken,
        now: Instant,
    ) -> (CallbackOutcome, Effects)
    where
        D: ExpandableDataSource + ?Sized,
    {
        let Some(pending) = self.downloads.settle(&mut self.store, token) else {
            return (CallbackOutcome::Ignored, Effects::new());
        };
        let mut effects = Effects::new();
        self.begin_expansion(data, token.section(), pending.animated, now, &mut effects);
        (CallbackOutcome::Applied, effects)
    }

    /// Handle a failed download: back to `Collapsed` and tell the delegate.
    pub fn fail_download(
        &mut self,
        token: DownloadToken,
        error: DownloadError,
    ) -> (CallbackOutcome, Effects) {
        if self.downloads.settle(&mut self.store, token).is_none() {
            return (CallbackOutcome::Ignored, Effects::new());
        }
        let section = token.section();
        log::debug!("Download for section {} failed: {}", section, error);
        let effects = vec![
            Effect::Surface(SurfaceCommand::UpdateTrigger {
                section,
                style: ExpansionStyle::Collapsed,
                loading: false,
                animated: false,
            }),
            Effect::Notify(Notification::DownloadFailed(section, error)),
        ];
        (CallbackOutcome::Applied, effects)
    }

    /// Finish a section's running animation now.
    ///
    /// Returns no effects if nothing was animating.
    pub fn finish_animation(&mut self, section: usize) -> Effects {
        let kind = match self.animations.finish(section) {
            Some(animation) => animation.kind,
            None if self.store.is_animating(section) => {
                if self.store.is_expanded(section) {
                    TransitionKind::Expand
                } else {
                    TransitionKind::Collapse
                }
            }
            None => return Effects::new(),
        };
        self.store.set_animating(section, false);
        let notification = match kind {
            TransitionKind::Expand => Notification::DidExpand(section),
            TransitionKind::Collapse => Notification::DidCollapse(section),
        };
        log::debug!("Animation for section {} finished ({:?})", section, kind);
        vec![Effect::Notify(notification)]
    }

    /// Finish every animation whose duration has elapsed at `now`.
    pub fn tick(&mut self, now: Instant) -> Effects {
        let due = self.animations.take_due(now);
        let mut effects = Effects::new();
        for animation in due {
            self.store.set_animating(animation.section, false);
            let notification = match animation.kind {
                TransitionKind::Expand => Notification::DidExpand(animation.section),
                TransitionKind::Collapse => Notification::DidCollapse(animation.section),
            };
            log::debug!("Animation for section {} elapsed", animation.section);
            effects.push(Effect::Notify(notification));
        }
        effects
    }

    // -------------------------------------------------------------------------
    // Reset
    // -------------------------------------------------------------------------

    /// Clear every cached flag.
    ///
    /// Outstanding downloads are cancelled and running animations dropped
    /// without notifications. The surface is not refreshed.
    pub fn reset_expansion_states(&mut self) -> Effects {
        self.animations.clear();
        self.store
            .reset_all()
            .into_iter()
            .filter_map(|(_, section)| section.outstanding_download())
            .map(Effect::CancelDownload)
            .collect()
    }

    /// Apply the datasource's preferred expansion states after a reset.
    pub fn apply_preferred_states<D>(&mut self, data: &D)
    where
        D: ExpandableDataSource + ?Sized,
    {
        for section in 0..data.section_count() {
            if data.preferred_expansion(section) == Some(ExpansionStyle::Expanded)
                && self.store.is_expandable(section, data)
            {
                log::debug!("Section {} starts expanded", section);
                self.store.set_expanded(section, true);
            }
        }
    }

    /// Full structural reload, optionally resetting every section first.
    pub fn reload_data<D>(&mut self, data: &D, reset: bool) -> Effects
    where
        D: ExpandableDataSource + ?Sized,
    {
        let mut effects = Effects::new();
        if reset {
            effects.extend(self.reset_expansion_states());
            self.apply_preferred_states(data);
        }
        effects.push(Effect::Surface(SurfaceCommand::ReloadData));
        effects.push(Effect::RefreshHeaderFooter);
        effects
    }
}

/// Physical indices of a section's logical rows (below the trigger row).
fn physical_rows(section: usize, count: usize) -> Vec<RowIndex> {
    (1..=count).map(|row| RowIndex::new(section, row)).collect()
}
