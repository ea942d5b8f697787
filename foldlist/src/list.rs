//! The expandable list handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockWriteGuard, Weak};
use std::time::Instant;

use crate::config::ExpandableConfig;
use crate::controller::ExpansionController;
use crate::datasource::{ExpandableDataSource, ExpandableDelegate};
use crate::download::DownloadToken;
use crate::effect::{Effect, Notification, SurfaceCommand};
use crate::error::{CallbackOutcome, DownloadError, ExpansionError};
use crate::proxy::{HeaderFooterStash, ListProxy, ProxyRow, RowSelection};
use crate::section::SectionPhase;
use crate::surface::{ListSurface, RowIndex};

/// Non-owning references to the collaborators.
struct Links<D: ?Sized, G: ?Sized, S: ?Sized> {
    data: Option<Weak<D>>,
    delegate: Option<Weak<G>>,
    surface: Option<Weak<S>>,
}

impl<D: ?Sized, G: ?Sized, S: ?Sized> Default for Links<D, G, S> {
    fn default() -> Self {
        Self {
            data: None,
            delegate: None,
            surface: None,
        }
    }
}

/// A list whose sections expand and collapse, loading their rows on demand.
///
/// `ExpandableList` is a cheap-to-clone handle: every clone shares the same
/// section state. Give a clone to whatever completes downloads.
///
/// The list never owns its datasource, delegate or surface; it keeps weak
/// references, so the surface that owns the list creates no cycle.
///
/// # Example
///
/// ```ignore
/// let list: ExpandableList<Repos, Loader, Screen> = ExpandableList::new();
/// list.set_data_source(&repos);
/// list.set_delegate(&loader);
/// list.set_surface(&screen);
///
/// list.expand_section(0, true)?;          // section 0 needs a download
/// // ... later, from the loader:
/// list.complete_download(token);
/// // ... and from the frame loop:
/// list.tick();
/// ```
pub struct ExpandableList<D, G, S>
where
    D: ?Sized,
    G: ?Sized,
    S: ListSurface + ?Sized,
{
    controller: Arc<RwLock<ExpansionController>>,
    links: Arc<RwLock<Links<D, G, S>>>,
    stash: Arc<Mutex<HeaderFooterStash<S::View>>>,
    /// Dirty flag for re-render
    dirty: Arc<AtomicBool>,
}

impl<D, G, S> ExpandableList<D, G, S>
where
    D: ExpandableDataSource + ?Sized,
    G: ExpandableDelegate + ?Sized,
    S: ListSurface + ?Sized,
{
    /// Create a list with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ExpandableConfig::default())
    }

    pub fn with_config(config: ExpandableConfig) -> Self {
        Self {
            controller: Arc::new(RwLock::new(ExpansionController::new(config))),
            links: Arc::new(RwLock::new(Links::default())),
            stash: Arc::new(Mutex::new(HeaderFooterStash::new())),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------

    pub fn set_data_source(&self, data: &Arc<D>) {
        if let Ok(mut guard) = self.links.write() {
            guard.data = Some(Arc::downgrade(data));
        }
    }

    pub fn set_delegate(&self, delegate: &Arc<G>) {
        if let Ok(mut guard) = self.links.write() {
            guard.delegate = Some(Arc::downgrade(delegate));
        }
    }

    pub fn set_surface(&self, surface: &Arc<S>) {
        if let Ok(mut guard) = self.links.write() {
            guard.surface = Some(Arc::downgrade(surface));
        }
    }

    fn data_source(&self) -> Option<Arc<D>> {
        self.links.read().ok()?.data.as_ref()?.upgrade()
    }

    fn delegate(&self) -> Option<Arc<G>> {
        self.links.read().ok()?.delegate.as_ref()?.upgrade()
    }

    fn surface(&self) -> Option<Arc<S>> {
        self.links.read().ok()?.surface.as_ref()?.upgrade()
    }

    fn attached(&self) -> Result<Arc<D>, ExpansionError> {
        self.data_source().ok_or(ExpansionError::DataSourceDetached)
    }

    fn lock_state(&self) -> Result<RwLockWriteGuard<'_, ExpansionController>, ExpansionError> {
        self.controller.write().map_err(|_| ExpansionError::Poisoned)
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    pub fn config(&self) -> ExpandableConfig {
        self.controller
            .read()
            .map(|guard| guard.config().clone())
            .unwrap_or_default()
    }

    /// Replace the configuration and re-evaluate header/footer visibility.
    pub fn set_config(&self, config: ExpandableConfig) {
        if let Ok(mut guard) = self.controller.write() {
            guard.set_config(config);
        }
        self.run(vec![Effect::RefreshHeaderFooter]);
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Expand a section.
    ///
    /// If the datasource says the section needs a download, the section
    /// enters `AwaitingData` and the delegate is asked to load it; the rows
    /// appear once [`complete_download`](Self::complete_download) is called.
    pub fn expand_section(&self, section: usize, animated: bool) -> Result<(), ExpansionError> {
        let data = self.attached()?;
        let effects = self
            .lock_state()?
            .expand_section(&*data, section, animated, Instant::now())?;
        self.run(effects);
        Ok(())
    }

    /// Collapse a section. A section awaiting data has its download cancelled.
    pub fn collapse_section(&self, section: usize, animated: bool) -> Result<(), ExpansionError> {
        let data = self.attached()?;
        let effects = self
            .lock_state()?
            .collapse_section(&*data, section, animated, Instant::now())?;
        self.run(effects);
        Ok(())
    }

    pub fn toggle_section(&self, section: usize) -> Result<(), ExpansionError> {
        let data = self.attached()?;
        let effects = self
            .lock_state()?
            .toggle_section(&*data, section, Instant::now())?;
        self.run(effects);
        Ok(())
    }

    pub fn cancel_download_in_section(&self, section: usize) -> Result<(), ExpansionError> {
        let effects = self.lock_state()?.cancel_download(section)?;
        self.run(effects);
        Ok(())
    }

    /// Clear every section's flags. Does not refresh the surface.
    pub fn reset_expansion_states(&self) {
        let Ok(effects) = self.lock_state().map(|mut c| c.reset_expansion_states()) else {
            log::error!("Cannot reset expansion states: lock poisoned");
            return;
        };
        self.run(effects);
    }

    /// Reload the whole surface, optionally resetting every section first.
    pub fn reload_data_and_reset_expansion_states(&self, reset: bool) -> Result<(), ExpansionError> {
        let data = self.attached()?;
        let effects = self.lock_state()?.reload_data(&*data, reset);
        self.run(effects);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Callbacks
    // -------------------------------------------------------------------------

    /// Report that the download for `token` finished.
    ///
    /// Stale tokens (cancelled, reset, superseded) are ignored.
    pub fn complete_download(&self, token: DownloadToken) -> CallbackOutcome {
        let Some(data) = self.data_source() else {
            log::warn!("Dropping completion for {}: datasource detached", token);
            return CallbackOutcome::Ignored;
        };
        let Ok((outcome, effects)) = self
            .lock_state()
            .map(|mut c| c.complete_download(&*data, token, Instant::now()))
        else {
            return CallbackOutcome::Ignored;
        };
        self.run(effects);
        outcome
    }

    /// Report that the download for `token` failed.
    pub fn fail_download(&self, token: DownloadToken, error: impl Into<DownloadError>) -> CallbackOutcome {
        let error = error.into();
        let Ok((outcome, effects)) = self.lock_state().map(|mut c| c.fail_download(token, error))
        else {
            return CallbackOutcome::Ignored;
        };
        self.run(effects);
        outcome
    }

    /// Report that a section's insert/remove animation finished.
    ///
    /// Returns false if the section was not animating.
    pub fn finish_animation(&self, section: usize) -> bool {
        let Ok(effects) = self.lock_state().map(|mut c| c.finish_animation(section)) else {
            return false;
        };
        let finished = !effects.is_empty();
        self.run(effects);
        finished
    }

    /// Finish every animation whose duration has elapsed.
    pub fn tick(&self) -> usize {
        self.tick_at(Instant::now())
    }

    /// Finish every animation whose duration has elapsed at `now`.
    ///
    /// Returns the number of animations finished.
    pub fn tick_at(&self, now: Instant) -> usize {
        let Ok(effects) = self.lock_state().map(|mut c| c.tick(now)) else {
            return 0;
        };
        let finished = effects.len();
        self.run(effects);
        finished
    }

    /// When the next running animation is due, if any.
    pub fn next_animation_deadline(&self) -> Option<Instant> {
        self.controller
            .read()
            .ok()
            .and_then(|guard| guard.animations().next_deadline())
    }

    // -------------------------------------------------------------------------
    // Section state
    // -------------------------------------------------------------------------

    pub fn can_expand_section(&self, section: usize) -> bool {
        let Some(data) = self.data_source() else {
            return false;
        };
        self.lock_state()
            .map(|mut c| c.can_expand_section(&*data, section))
            .unwrap_or(false)
    }

    pub fn is_section_expanded(&self, section: usize) -> bool {
        self.controller
            .read()
            .map(|guard| guard.is_section_expanded(section))
            .unwrap_or(false)
    }

    pub fn is_section_downloading(&self, section: usize) -> bool {
        self.controller
            .read()
            .map(|guard| guard.store().is_downloading(section))
            .unwrap_or(false)
    }

    pub fn is_section_animating(&self, section: usize) -> bool {
        self.controller
            .read()
            .map(|guard| guard.store().is_animating(section))
            .unwrap_or(false)
    }

    pub fn section_phase(&self, section: usize) -> SectionPhase {
        self.controller
            .read()
            .map(|guard| guard.phase(section))
            .unwrap_or(SectionPhase::Collapsed)
    }

    // -------------------------------------------------------------------------
    // Row queries (physical space)
    // -------------------------------------------------------------------------

    fn with_proxy<R>(&self, f: impl FnOnce(&mut ListProxy<'_, D>) -> R) -> Option<R> {
        let data = self.data_source()?;
        let mut guard = self.controller.write().ok()?;
        let mut proxy = ListProxy::new(guard.store_mut(), &*data);
        Some(f(&mut proxy))
    }

    pub fn number_of_sections(&self) -> usize {
        self.with_proxy(|p| p.number_of_sections()).unwrap_or(0)
    }

    pub fn number_of_rows(&self, section: usize) -> usize {
        self.with_proxy(|p| p.number_of_rows(section)).unwrap_or(0)
    }

    pub fn total_row_count(&self) -> usize {
        self.with_proxy(|p| p.total_row_count()).unwrap_or(0)
    }

    pub fn row_at(&self, index: RowIndex) -> Option<ProxyRow<D::Row, D::Trigger>> {
        self.with_proxy(|p| p.row_at(index)).flatten()
    }

    /// Logical index of a physical row; `None` for trigger rows.
    pub fn logical_index(&self, index: RowIndex) -> Option<RowIndex> {
        self.with_proxy(|p| p.logical_index(index)).flatten()
    }

    pub fn physical_index(&self, index: RowIndex) -> RowIndex {
        self.with_proxy(|p| p.physical_index(index)).unwrap_or(index)
    }

    /// Handle a selection of a physical row.
    ///
    /// Trigger rows toggle their section; every other row is forwarded to
    /// the delegate at its logical index.
    pub fn select_row(&self, index: RowIndex) -> Result<RowSelection, ExpansionError> {
        let data = self.attached()?;
        let route = {
            let mut guard = self.lock_state()?;
            let mut proxy = ListProxy::new(guard.store_mut(), &*data);
            proxy.route_selection(index)
        };
        match route {
            RowSelection::Toggle(section) => self.toggle_section(section)?,
            RowSelection::Forward(logical) => {
                if let Some(delegate) = self.delegate() {
                    delegate.did_select_row(logical);
                }
            }
        }
        Ok(route)
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the surface was told to change since the last check.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Effect execution
    // -------------------------------------------------------------------------

    /// Execute effects in order. Must be called without the state lock held.
    fn run(&self, effects: Vec<Effect>) {
        if effects.is_empty() {
            return;
        }
        if effects.iter().any(Effect::touches_surface) {
            self.dirty.store(true, Ordering::SeqCst);
        }
        let delegate = self.delegate();
        let surface = self.surface();

        for effect in effects {
            log::trace!("Executing {:?}", effect);
            match effect {
                Effect::Notify(notification) => {
                    if let Some(delegate) = &delegate {
                        notify(&**delegate, notification);
                    }
                }
                Effect::Surface(command) => {
                    if let Some(surface) = &surface {
                        apply(&**surface, command);
                    }
                }
                Effect::StartDownload(token) => match &delegate {
                    Some(delegate) => delegate.download_data(token.section(), token),
                    None => log::warn!("No delegate to start {}", token),
                },
                Effect::CancelDownload(token) => {
                    if let Some(delegate) = &delegate {
                        delegate.cancel_download(token);
                    }
                }
                Effect::RefreshHeaderFooter => {
                    if let Some(surface) = &surface {
                        self.refresh_header_footer(&**surface);
                    }
                }
            }
        }
    }

    fn refresh_header_footer(&self, surface: &S) {
        let enabled = self.config().only_display_header_and_footer_if_not_empty;
        let total = self.total_row_count();
        if let Ok(mut stash) = self.stash.lock() {
            stash.apply(surface, enabled, total);
        }
    }
}

fn notify<G: ExpandableDelegate + ?Sized>(delegate: &G, notification: Notification) {
    match notification {
        Notification::WillExpand(section) => delegate.will_expand(section),
        Notification::DidExpand(section) => delegate.did_expand(section),
        Notification::WillCollapse(section) => delegate.will_collapse(section),
        Notification::DidCollapse(section) => delegate.did_collapse(section),
        Notification::DownloadFailed(section, error) => delegate.download_failed(section, &error),
        Notification::WillDisplayWhileAnimating(index) => {
            delegate.will_display_row_while_animating(index)
        }
    }
}

fn apply<S: ListSurface + ?Sized>(surface: &S, command: SurfaceCommand) {
    match command {
        SurfaceCommand::InsertRows { rows, animation } => surface.insert_rows(&rows, animation),
        SurfaceCommand::DeleteRows { rows, animation } => surface.delete_rows(&rows, animation),
        SurfaceCommand::ReloadSection { section, animation } => {
            surface.reload_section(section, animation)
        }
        SurfaceCommand::ReloadData => surface.reload_data(),
        SurfaceCommand::UpdateTrigger {
            section,
            style,
            loading,
            animated,
        } => surface.update_trigger(section, style, loading, animated),
    }
}

impl<D, G, S> Clone for ExpandableList<D, G, S>
where
    D: ?Sized,
    G: ?Sized,
    S: ListSurface + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            links: Arc::clone(&self.links),
            stash: Arc::clone(&self.stash),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl<D, G, S> Default for ExpandableList<D, G, S>
where
    D: ExpandableDataSource + ?Sized,
    G: ExpandableDelegate + ?Sized,
    S: ListSurface + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}
