//! Running insert/remove animations.
//!
//! The control does not render anything, so an animation is only a
//! deadline: once `animation_duration` has elapsed the section's transition
//! is finished. Hosts either drive this with [`tick`](crate::ExpandableList::tick)
//! or report completion themselves with
//! [`finish_animation`](crate::ExpandableList::finish_animation).

use std::time::{Duration, Instant};

/// Direction of a section transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Expand,
    Collapse,
}

/// A single running row animation for one section.
#[derive(Debug, Clone)]
pub struct SectionAnimation {
    pub section: usize,
    pub kind: TransitionKind,
    pub start_time: Instant,
    pub duration: Duration,
}

impl SectionAnimation {
    pub fn new(section: usize, kind: TransitionKind, duration: Duration, now: Instant) -> Self {
        Self {
            section,
            kind,
            start_time: now,
            duration,
        }
    }

    /// Progress at `now` (0.0 to 1.0).
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start_time);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start_time) >= self.duration
    }
}

/// Every running animation, at most one per section.
#[derive(Debug, Default)]
pub struct AnimationSchedule {
    running: Vec<SectionAnimation>,
}

impl AnimationSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an animation, replacing any previous one for the same section.
    pub fn start(&mut self, animation: SectionAnimation) {
        self.running.retain(|a| a.section != animation.section);
        self.running.push(animation);
    }

    /// Remove and return a section's animation.
    pub fn finish(&mut self, section: usize) -> Option<SectionAnimation> {
        let index = self.running.iter().position(|a| a.section == section)?;
        Some(self.running.remove(index))
    }

    /// Remove and return every animation that is complete at `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<SectionAnimation> {
        let (due, running) = std::mem::take(&mut self.running)
            .into_iter()
            .partition(|a| a.is_complete(now));
        self.running = running;
        due
    }

    pub fn get(&self, section: usize) -> Option<&SectionAnimation> {
        self.running.iter().find(|a| a.section == section)
    }

    pub fn is_running(&self, section: usize) -> bool {
        self.get(section).is_some()
    }

    /// Earliest instant at which some animation completes.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.running.iter().map(|a| a.start_time + a.duration).min()
    }

    pub fn clear(&mut self) {
        self.running.clear();
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}
