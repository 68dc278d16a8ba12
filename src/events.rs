//! Cancellable event pipeline shared by every window transition.
//!
//! Each observable transition follows the same protocol:
//!
//! 1. `trigger` builds an [`EventDatum`] and runs every `Before` observer for
//!    the event kind, in registration order. Any of them may call
//!    [`EventDatum::cancel`]; the remaining observers still run.
//! 2. The caller checks [`EventDatum::is_cancelled`] and skips its default
//!    behavior when set.
//! 3. After the default behavior, the caller hands the datum to `finish`,
//!    which runs the `After` observers.
//!
//! Observers only see the datum. They cannot reach back into the window
//! manager while a transition is half-applied.

use std::fmt;

use crossterm::event::KeyEvent;

use crate::window::{FloatRect, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Open,
    Close,
    Toggle,
    Max,
    Min,
    Action,
    Keydown,
    Moving,
    Moved,
    Resize,
    Resizing,
    Resized,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Open => "open",
            EventKind::Close => "close",
            EventKind::Toggle => "toggle",
            EventKind::Max => "max",
            EventKind::Min => "min",
            EventKind::Action => "action",
            EventKind::Keydown => "keydown",
            EventKind::Moving => "moving",
            EventKind::Moved => "moved",
            EventKind::Resize => "resize",
            EventKind::Resizing => "resizing",
            EventKind::Resized => "resized",
        };
        f.write_str(s)
    }
}

/// When an observer runs relative to the default behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Before,
    After,
}

/// Contextual payload carried by an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    None,
    /// `present` is true when the open replaces content of an existing node.
    Open { present: bool },
    Rect(FloatRect),
    Action { name: String },
    Key(KeyEvent),
}

#[derive(Debug, Clone)]
pub struct EventDatum {
    kind: EventKind,
    window: WindowId,
    target: &'static str,
    detail: EventDetail,
    cancelled: bool,
}

impl EventDatum {
    pub fn new(kind: EventKind, window: WindowId, detail: EventDetail) -> Self {
        Self {
            kind,
            window,
            target: "popup",
            detail,
            cancelled: false,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn window(&self) -> &WindowId {
        &self.window
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn detail(&self) -> &EventDetail {
        &self.detail
    }

    /// Rectangle carried by move/resize events.
    pub fn rect(&self) -> Option<FloatRect> {
        match self.detail {
            EventDetail::Rect(rect) => Some(rect),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Veto the default behavior. Once cancelled, a datum stays cancelled.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

pub type Observer = Box<dyn FnMut(&mut EventDatum)>;

struct Registration {
    id: ObserverId,
    kind: EventKind,
    phase: Phase,
    observer: Observer,
}

#[derive(Default)]
pub struct EventPipeline {
    registrations: Vec<Registration>,
    next_id: u64,
}

impl fmt::Debug for EventPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPipeline")
            .field("observers", &self.registrations.len())
            .finish()
    }
}

impl EventPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, kind: EventKind, phase: Phase, observer: F) -> ObserverId
    where
        F: FnMut(&mut EventDatum) + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.registrations.push(Registration {
            id,
            kind,
            phase,
            observer: Box::new(observer),
        });
        id
    }

    /// Remove an observer. Returns false when the id was unknown.
    pub fn off(&mut self, id: ObserverId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|registration| registration.id != id);
        self.registrations.len() != before
    }

    pub fn observer_count(&self, kind: EventKind) -> usize {
        self.registrations
            .iter()
            .filter(|registration| registration.kind == kind)
            .count()
    }

    pub fn trigger(&mut self, kind: EventKind, window: &WindowId, detail: EventDetail) -> EventDatum {
        let mut datum = EventDatum::new(kind, window.clone(), detail);
        self.dispatch(Phase::Before, &mut datum);
        if datum.is_cancelled() {
            tracing::debug!(window_id = %window, event = %kind, "event cancelled by observer");
        }
        datum
    }

    pub fn finish(&mut self, mut datum: EventDatum) {
        self.dispatch(Phase::After, &mut datum);
    }

    fn dispatch(&mut self, phase: Phase, datum: &mut EventDatum) {
        let kind = datum.kind;
        for registration in self
            .registrations
            .iter_mut()
            .filter(|registration| registration.kind == kind && registration.phase == phase)
        {
            (registration.observer)(datum);
        }
    }
}
