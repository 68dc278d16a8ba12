//! Deferred completions of animated transitions.

use std::fmt;
use std::time::Instant;

use crate::events::EventDatum;
use crate::window::{ResizeDone, WindowId};

pub(crate) enum Completion {
    Opened,
    Closed,
    Maximized,
    Restored,
    Toggled,
    Resized(Option<ResizeDone>),
    ContentSwapped,
    /// Carries the lock sequence number it is allowed to clear.
    Unlocked(u64),
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Opened => f.write_str("Opened"),
            Completion::Closed => f.write_str("Closed"),
            Completion::Maximized => f.write_str("Maximized"),
            Completion::Restored => f.write_str("Restored"),
            Completion::Toggled => f.write_str("Toggled"),
            Completion::Resized(done) => write!(f, "Resized(callback: {})", done.is_some()),
            Completion::ContentSwapped => f.write_str("ContentSwapped"),
            Completion::Unlocked(seq) => write!(f, "Unlocked({seq})"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct PendingCompletion {
    pub window: WindowId,
    /// Lifecycle generation of the window when this was scheduled.
    pub generation: u64,
    pub due: Instant,
    pub completion: Completion,
    pub datum: Option<EventDatum>,
}

#[derive(Debug, Default)]
pub(crate) struct AnimationQueue {
    pending: Vec<PendingCompletion>,
}

impl AnimationQueue {
    pub fn schedule(&mut self, pending: PendingCompletion) {
        tracing::debug!(
            window_id = %pending.window,
            completion = ?pending.completion,
            "scheduling transition completion"
        );
        // keep deadline order; equal deadlines fire in scheduling order
        let idx = self
            .pending
            .iter()
            .position(|queued| queued.due > pending.due)
            .unwrap_or(self.pending.len());
        self.pending.insert(idx, pending);
    }

    /// Remove and return the earliest completion due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<PendingCompletion> {
        if self.pending.first().is_some_and(|first| first.due <= now) {
            Some(self.pending.remove(0))
        } else {
            None
        }
    }

    /// Remove and return the earliest completion regardless of deadline.
    pub fn pop_next(&mut self) -> Option<PendingCompletion> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn take_for<F>(&mut self, window: &WindowId, matches: F) -> Option<PendingCompletion>
    where
        F: Fn(&Completion) -> bool,
    {
        let idx = self
            .pending
            .iter()
            .position(|queued| &queued.window == window && matches(&queued.completion))?;
        Some(self.pending.remove(idx))
    }

    /// Drop everything queued for `window`.
    pub fn discard_window(&mut self, window: &WindowId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|queued| &queued.window != window);
        before - self.pending.len()
    }

    pub fn has_pending(&self, window: &WindowId) -> bool {
        self.pending.iter().any(|queued| &queued.window == window)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.first().map(|queued| queued.due)
    }
}
