use crate::layout::floating::{ResizeEdge, apply_move_delta, apply_resize_delta, pointer_delta};
use crate::window::FloatRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize(ResizeEdge),
}

/// One pointer-down to pointer-up interaction with a window.
///
/// Proposed rectangles are always computed from the start state, never
/// accumulated, so dropped pointer events cannot make a window drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureSession {
    kind: GestureKind,
    origin: (u16, u16),
    start_rect: FloatRect,
    locked: bool,
}

impl GestureSession {
    /// `locked` records whether the window already carried a lock overlay.
    pub fn drag(origin: (u16, u16), start_rect: FloatRect, locked: bool) -> Self {
        Self {
            kind: GestureKind::Move,
            origin,
            start_rect,
            locked,
        }
    }

    pub fn resize(edge: ResizeEdge, origin: (u16, u16), start_rect: FloatRect, locked: bool) -> Self {
        Self {
            kind: GestureKind::Resize(edge),
            origin,
            start_rect,
            locked,
        }
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    pub fn start_rect(&self) -> FloatRect {
        self.start_rect
    }

    /// Whether this session put the transparent lock in place and so must
    /// take it down again.
    pub fn acquired_lock(&self) -> bool {
        !self.locked
    }

    pub fn delta(&self, column: u16, row: u16) -> (i32, i32) {
        pointer_delta(self.origin, column, row)
    }

    pub fn propose(&self, column: u16, row: u16) -> FloatRect {
        let (dx, dy) = self.delta(column, row);
        match self.kind {
            GestureKind::Move => apply_move_delta(self.start_rect, dx, dy),
            GestureKind::Resize(edge) => apply_resize_delta(self.start_rect, edge, dx, dy),
        }
    }
}
