mod common;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use foldlist::prelude::*;

use common::{Call, FakeData, RecordingSurface, SectionSpec, SurfaceCall, harness, harness_with};

// =============================================================================
// Expansion Lifecycle
// =============================================================================

#[test]
fn test_download_expand_collapse_scenario() {
    let h = harness(vec![SectionSpec::remote(3)]);

    h.list.expand_section(0, true).unwrap();
    assert_eq!(h.list.section_phase(0), SectionPhase::AwaitingData);
    assert!(h.list.is_section_downloading(0));
    assert!(!h.list.is_section_expanded(0));
    assert_eq!(h.list.number_of_rows(0), 1);
    assert_eq!(h.delegate.calls(), vec![Call::WillExpand(0), Call::Download(0)]);

    let token = h.delegate.last_token().unwrap();
    assert_eq!(token.section(), 0);
    assert_eq!(h.list.complete_download(token), CallbackOutcome::Applied);
    assert_eq!(h.list.section_phase(0), SectionPhase::Expanded);
    assert!(!h.list.is_section_downloading(0));
    assert_eq!(h.list.number_of_rows(0), 4);

    assert!(h.list.finish_animation(0));
    assert_eq!(h.delegate.count(&Call::DidExpand(0)), 1);

    h.list.collapse_section(0, true).unwrap();
    assert_eq!(h.list.number_of_rows(0), 1);
    assert!(!h.list.is_section_expanded(0));
    assert_eq!(h.list.section_phase(0), SectionPhase::Collapsing);

    assert!(h.list.finish_animation(0));
    assert_eq!(h.delegate.count(&Call::DidCollapse(0)), 1);
    assert_eq!(h.delegate.count(&Call::WillCollapse(0)), 1);
    assert_eq!(h.list.section_phase(0), SectionPhase::Collapsed);
}

#[test]
fn test_non_expandable_section_rejects_expand() {
    let h = harness(vec![SectionSpec::plain(3)]);

    let err = h.list.expand_section(0, true).unwrap_err();
    assert_eq!(err.reason(), Some(InvalidStateReason::NotExpandable));
    assert_eq!(h.list.section_phase(0), SectionPhase::Collapsed);
    assert!(!h.list.is_section_expanded(0));
    assert!(h.delegate.calls().is_empty());
    assert!(h.surface.calls().is_empty());

    let err = h.list.collapse_section(0, false).unwrap_err();
    assert_eq!(err.reason(), Some(InvalidStateReason::NotExpandable));
    assert!(!h.list.can_expand_section(0));
}

#[test]
fn test_expand_then_collapse_restores_flags() {
    let h = harness(vec![SectionSpec::expandable(2)]);

    h.list.expand_section(0, false).unwrap();
    assert!(h.list.is_section_expanded(0));
    assert!(!h.list.is_section_animating(0));
    assert_eq!(h.delegate.count(&Call::DidExpand(0)), 1);

    h.list.collapse_section(0, false).unwrap();
    assert!(!h.list.is_section_expanded(0));
    assert!(!h.list.is_section_downloading(0));
    assert!(!h.list.is_section_animating(0));
    assert_eq!(h.list.section_phase(0), SectionPhase::Collapsed);
    assert_eq!(h.delegate.count(&Call::DidCollapse(0)), 1);
}

#[test]
fn test_second_expand_while_animating_is_rejected() {
    let h = harness(vec![SectionSpec::expandable(2)]);

    h.list.expand_section(0, true).unwrap();
    assert!(h.list.is_section_animating(0));

    let err = h.list.expand_section(0, true).unwrap_err();
    assert_eq!(err.reason(), Some(InvalidStateReason::Animating));
    let err = h.list.collapse_section(0, true).unwrap_err();
    assert_eq!(err.reason(), Some(InvalidStateReason::Animating));

    assert_eq!(h.surface.inserts().len(), 1);
    assert_eq!(h.delegate.count(&Call::WillExpand(0)), 1);

    h.list.finish_animation(0);
    let err = h.list.expand_section(0, true).unwrap_err();
    assert_eq!(err.reason(), Some(InvalidStateReason::AlreadyExpanded));
    assert_eq!(h.delegate.count(&Call::DidExpand(0)), 1);
}

#[test]
fn test_collapse_collapsed_section_fails() {
    let h = harness(vec![SectionSpec::expandable(2)]);
    let err = h.list.collapse_section(0, true).unwrap_err();
    assert_eq!(err.reason(), Some(InvalidStateReason::NotExpanded));
    assert!(err.is_invalid_state());
}

#[test]
fn test_animated_expand_inserts_rows_and_announces_them() {
    let h = harness(vec![SectionSpec::plain(1), SectionSpec::expandable(2)]);

    h.list.expand_section(1, true).unwrap();

    let rows = vec![RowIndex::new(1, 1), RowIndex::new(1, 2)];
    assert_eq!(h.surface.inserts(), vec![SurfaceCall::Insert(rows.clone(), RowAnimation::Top)]);
    let announced: Vec<Call> = h
        .delegate
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::WillDisplay(_)))
        .collect();
    assert_eq!(announced, rows.into_iter().map(Call::WillDisplay).collect::<Vec<_>>());
    assert_eq!(h.delegate.count(&Call::DidExpand(1)), 0);
}

#[test]
fn test_collapse_removes_physical_rows() {
    let h = harness(vec![SectionSpec::expandable(3)]);
    h.list.expand_section(0, false).unwrap();
    h.surface.clear();

    h.list.collapse_section(0, true).unwrap();
    assert!(h.surface.calls().contains(&SurfaceCall::Delete(
        vec![RowIndex::new(0, 1), RowIndex::new(0, 2), RowIndex::new(0, 3)],
        RowAnimation::Top,
    )));
}

#[test]
fn test_expanding_empty_section_finishes_immediately() {
    let h = harness(vec![SectionSpec::expandable(0)]);
    h.list.expand_section(0, true).unwrap();
    assert!(!h.list.is_section_animating(0));
    assert_eq!(h.delegate.count(&Call::DidExpand(0)), 1);
    assert_eq!(h.list.number_of_rows(0), 1);
}

// =============================================================================
// Animation Threshold
// =============================================================================

#[test]
fn test_large_section_skips_animation() {
    let config = ExpandableConfig::new().max_animated_rows(5);
    let h = harness_with(vec![SectionSpec::expandable(10)], config, RecordingSurface::new());

    h.list.expand_section(0, true).unwrap();

    assert!(!h.list.is_section_animating(0));
    assert!(h.surface.inserts().is_empty());
    assert!(
        h.surface
            .calls()
            .contains(&SurfaceCall::ReloadSection(0, RowAnimation::None))
    );
    assert_eq!(h.delegate.count(&Call::DidExpand(0)), 1);
    assert_eq!(h.list.number_of_rows(0), 11);
    assert!(!h.list.finish_animation(0));
}

#[test]
fn test_threshold_is_inclusive() {
    let config = ExpandableConfig::new().max_animated_rows(5);
    let h = harness_with(vec![SectionSpec::expandable(5)], config, RecordingSurface::new());

    h.list.expand_section(0, true).unwrap();
    assert!(h.list.is_section_animating(0));
    assert_eq!(h.surface.inserts().len(), 1);
}

#[test]
fn test_large_downloaded_section_skips_animation() {
    let config = ExpandableConfig::new().max_animated_rows(5);
    let h = harness_with(vec![SectionSpec::remote(8)], config, RecordingSurface::new());

    h.list.expand_section(0, true).unwrap();
    h.list.complete_download(h.delegate.last_token().unwrap());

    assert!(h.list.is_section_expanded(0));
    assert!(!h.list.is_section_animating(0));
    assert_eq!(h.delegate.count(&Call::DidExpand(0)), 1);
}

// =============================================================================
// Download Cancellation And Stale Callbacks
// =============================================================================

#[test]
fn test_completion_after_cancel_is_ignored() {
    let h = harness(vec![SectionSpec::remote(3)]);
    h.list.expand_section(0, true).unwrap();
    let token = h.delegate.last_token().unwrap();

    h.list.cancel_download_in_section(0).unwrap();
    assert_eq!(h.delegate.count(&Call::Cancel(0)), 1);
    assert_eq!(h.list.section_phase(0), SectionPhase::Collapsed);
    assert!(h.surface.calls().contains(&SurfaceCall::Trigger {
        section: 0,
        style: ExpansionStyle::Collapsed,
        loading: false,
    }));

    assert_eq!(h.list.complete_download(token), CallbackOutcome::Ignored);
    assert!(!h.list.is_section_expanded(0));
    assert!(h.surface.inserts().is_empty());
    assert_eq!(h.list.number_of_rows(0), 1);
}

#[test]
fn test_collapse_while_awaiting_cancels_download() {
    let h = harness(vec![SectionSpec::remote(3)]);
    h.list.expand_section(0, true).unwrap();
    let token = h.delegate.last_token().unwrap();

    h.list.collapse_section(0, true).unwrap();
    assert_eq!(h.delegate.count(&Call::Cancel(0)), 1);
    assert!(!h.list.is_section_downloading(0));

    assert_eq!(h.list.complete_download(token), CallbackOutcome::Ignored);
    assert!(!h.list.is_section_expanded(0));
    assert_eq!(h.delegate.count(&Call::DidExpand(0)), 0);
}

#[test]
fn test_old_token_does_not_complete_new_request() {
    let h = harness(vec![SectionSpec::remote(2)]);
    h.list.expand_section(0, true).unwrap();
    let first = h.delegate.last_token().unwrap();
    h.list.cancel_download_in_section(0).unwrap();

    h.list.expand_section(0, true).unwrap();
    let second = h.delegate.last_token().unwrap();
    assert_ne!(first, second);

    assert_eq!(h.list.complete_download(first), CallbackOutcome::Ignored);
    assert_eq!(h.list.section_phase(0), SectionPhase::AwaitingData);
    assert_eq!(h.list.complete_download(second), CallbackOutcome::Applied);
    assert_eq!(h.list.section_phase(0), SectionPhase::Expanded);
}

#[test]
fn test_duplicate_completion_is_ignored() {
    let h = harness(vec![SectionSpec::remote(2)]);
    h.list.expand_section(0, false).unwrap();
    let token = h.delegate.last_token().unwrap();

    assert!(h.list.complete_download(token).is_applied());
    assert_eq!(h.list.complete_download(token), CallbackOutcome::Ignored);
    assert_eq!(h.delegate.count(&Call::DidExpand(0)), 1);
}

#[test]
fn test_expand_while_awaiting_is_rejected() {
    let h = harness(vec![SectionSpec::remote(2)]);
    h.list.expand_section(0, true).unwrap();

    let err = h.list.expand_section(0, true).unwrap_err();
    assert_eq!(err.reason(), Some(InvalidStateReason::Downloading));
    assert_eq!(h.delegate.count(&Call::Download(0)), 1);
}

#[test]
fn test_cancel_without_download_fails() {
    let h = harness(vec![SectionSpec::remote(2)]);
    let err = h.list.cancel_download_in_section(0).unwrap_err();
    assert_eq!(err.reason(), Some(InvalidStateReason::NotDownloading));
    assert!(h.delegate.calls().is_empty());
}

#[test]
fn test_failed_download_returns_to_collapsed() {
    let h = harness(vec![SectionSpec::remote(2)]);
    h.list.expand_section(0, true).unwrap();
    let token = h.delegate.last_token().unwrap();

    assert_eq!(h.list.fail_download(token, "timeout"), CallbackOutcome::Applied);
    assert_eq!(h.list.section_phase(0), SectionPhase::Collapsed);
    assert!(h.delegate.calls().contains(&Call::Failed(0, "timeout".to_string())));
    assert_eq!(h.list.fail_download(token, "again"), CallbackOutcome::Ignored);

    // Retrying is just another expand.
    h.list.expand_section(0, true).unwrap();
    assert_eq!(h.delegate.count(&Call::Download(0)), 2);
}

#[test]
fn test_trigger_shows_loading_while_awaiting() {
    let h = harness(vec![SectionSpec::remote(2)]);
    h.list.expand_section(0, true).unwrap();
    assert!(h.surface.calls().contains(&SurfaceCall::Trigger {
        section: 0,
        style: ExpansionStyle::Collapsed,
        loading: true,
    }));

    h.list.complete_download(h.delegate.last_token().unwrap());
    assert!(h.surface.calls().contains(&SurfaceCall::Trigger {
        section: 0,
        style: ExpansionStyle::Expanded,
        loading: false,
    }));
}

// =============================================================================
// Toggle
// =============================================================================

#[test]
fn test_toggle_cycles_section() {
    let h = harness(vec![SectionSpec::expandable(2)]);

    h.list.toggle_section(0).unwrap();
    assert!(h.list.is_section_expanded(0));
    assert!(h.list.is_section_animating(0));
    h.list.finish_animation(0);

    h.list.toggle_section(0).unwrap();
    assert!(!h.list.is_section_expanded(0));
    h.list.finish_animation(0);
    assert_eq!(h.list.section_phase(0), SectionPhase::Collapsed);
}

#[test]
fn test_toggle_while_awaiting_cancels() {
    let h = harness(vec![SectionSpec::remote(2)]);
    h.list.toggle_section(0).unwrap();
    assert_eq!(h.list.section_phase(0), SectionPhase::AwaitingData);

    h.list.toggle_section(0).unwrap();
    assert_eq!(h.list.section_phase(0), SectionPhase::Collapsed);
    assert_eq!(h.delegate.count(&Call::Cancel(0)), 1);
}

// =============================================================================
// Animation Timing
// =============================================================================

#[test]
fn test_tick_finishes_elapsed_animations() {
    let config = ExpandableConfig::new().animation_duration(Duration::from_millis(100));
    let h = harness_with(
        vec![SectionSpec::expandable(2), SectionSpec::expandable(1)],
        config,
        RecordingSurface::new(),
    );

    h.list.expand_section(0, true).unwrap();
    h.list.expand_section(1, true).unwrap();
    assert!(h.list.next_animation_deadline().is_some());

    assert_eq!(h.list.tick_at(Instant::now() + Duration::from_secs(1)), 2);
    assert!(!h.list.is_section_animating(0));
    assert!(!h.list.is_section_animating(1));
    assert_eq!(h.delegate.count(&Call::DidExpand(0)), 1);
    assert_eq!(h.delegate.count(&Call::DidExpand(1)), 1);
    assert!(h.list.next_animation_deadline().is_none());
    assert_eq!(h.list.tick(), 0);
}

#[test]
fn test_sections_animate_independently() {
    let h = harness(vec![SectionSpec::expandable(2), SectionSpec::expandable(2)]);

    h.list.expand_section(0, true).unwrap();
    h.list.expand_section(1, true).unwrap();
    assert!(h.list.finish_animation(1));
    h.list.collapse_section(1, true).unwrap();

    assert!(h.list.is_section_animating(0));
    assert_eq!(h.list.section_phase(1), SectionPhase::Collapsing);
}

// =============================================================================
// Reset
// =============================================================================

#[test]
fn test_reset_cancels_downloads_and_drops_late_completion() {
    let h = harness(vec![SectionSpec::remote(2), SectionSpec::expandable(2)]);
    h.list.expand_section(0, true).unwrap();
    h.list.expand_section(1, false).unwrap();
    let token = h.delegate.last_token().unwrap();
    h.surface.clear();

    h.list.reset_expansion_states();
    assert_eq!(h.delegate.count(&Call::Cancel(0)), 1);
    assert!(!h.list.is_section_expanded(1));
    assert!(h.surface.calls().is_empty());

    assert_eq!(h.list.complete_download(token), CallbackOutcome::Ignored);
    assert!(!h.list.is_section_expanded(0));
}

#[test]
fn test_reset_reresolves_expandable() {
    let h = harness(vec![SectionSpec::expandable(2)]);
    assert!(h.list.can_expand_section(0));
    h.data.set_expandable(0, false);
    assert!(h.list.can_expand_section(0));

    h.list.reset_expansion_states();
    assert!(!h.list.can_expand_section(0));
    assert_eq!(h.data.expandable_queries(), 2);
}

#[test]
fn test_reload_applies_preferred_states() {
    let h = harness(vec![
        SectionSpec::expandable(2).preferring(ExpansionStyle::Expanded),
        SectionSpec::expandable(2),
        SectionSpec::plain(1).preferring(ExpansionStyle::Expanded),
    ]);
    h.list.expand_section(1, false).unwrap();

    h.list.reload_data_and_reset_expansion_states(true).unwrap();

    assert!(h.list.is_section_expanded(0));
    assert!(!h.list.is_section_expanded(1));
    assert!(!h.list.is_section_expanded(2));
    assert_eq!(h.list.number_of_rows(0), 3);
    assert_eq!(h.list.number_of_rows(2), 1);
    assert_eq!(h.surface.calls().last(), Some(&SurfaceCall::ReloadData));
}

#[test]
fn test_reload_without_reset_keeps_states() {
    let h = harness(vec![SectionSpec::expandable(2)]);
    h.list.expand_section(0, false).unwrap();

    h.list.reload_data_and_reset_expansion_states(false).unwrap();
    assert!(h.list.is_section_expanded(0));
}

// =============================================================================
// Collaborators
// =============================================================================

#[test]
fn test_detached_datasource() {
    let h = harness(vec![SectionSpec::expandable(2)]);
    let list = h.list.clone();
    drop(h);

    assert_eq!(list.expand_section(0, true), Err(ExpansionError::DataSourceDetached));
    assert_eq!(list.number_of_rows(0), 0);
    assert!(!list.can_expand_section(0));
}

#[test]
fn test_clones_share_state() {
    let h = harness(vec![SectionSpec::expandable(2)]);
    let other = h.list.clone();
    other.expand_section(0, false).unwrap();
    assert!(h.list.is_section_expanded(0));
}

#[test]
fn test_dirty_tracking() {
    let h = harness(vec![SectionSpec::expandable(2)]);
    assert!(!h.list.is_dirty());
    h.list.expand_section(0, false).unwrap();
    assert!(h.list.is_dirty());
    h.list.clear_dirty();
    assert!(!h.list.is_dirty());
}

/// Delegate that completes every download before returning.
struct InstantLoader {
    list: Mutex<Option<ExpandableList<FakeData, InstantLoader, RecordingSurface>>>,
}

impl ExpandableDelegate for InstantLoader {
    fn download_data(&self, _section: usize, token: DownloadToken) {
        let list = self.list.lock().unwrap().clone();
        if let Some(list) = list {
            list.complete_download(token);
        }
    }
}

#[test]
fn test_synchronous_completion_inside_download_request() {
    let data = FakeData::new(vec![SectionSpec::remote(2)]);
    let surface = RecordingSurface::new();
    let loader = Arc::new(InstantLoader {
        list: Mutex::new(None),
    });
    let list = ExpandableList::new();
    list.set_data_source(&data);
    list.set_delegate(&loader);
    list.set_surface(&surface);
    *loader.list.lock().unwrap() = Some(list.clone());

    list.expand_section(0, false).unwrap();

    assert_eq!(list.section_phase(0), SectionPhase::Expanded);
    assert_eq!(list.number_of_rows(0), 3);
}
