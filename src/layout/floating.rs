use crate::constants::RESIZE_MIN_EXTENT;
use crate::window::FloatRect;

/// Edge of a window a resize gesture is anchored on.
///
/// The origin of a window never moves during a resize; only the far edges
/// are grabbable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Right,
    Bottom,
    BottomRight,
}

impl ResizeEdge {
    fn grows_width(self) -> bool {
        matches!(self, ResizeEdge::Right | ResizeEdge::BottomRight)
    }

    fn grows_height(self) -> bool {
        matches!(self, ResizeEdge::Bottom | ResizeEdge::BottomRight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeHandle {
    pub rect: FloatRect,
    pub edge: ResizeEdge,
}

pub fn resize_handles_for_rect(rect: FloatRect) -> Vec<ResizeHandle> {
    let mut handles = Vec::new();
    if rect.width == 0 || rect.height == 0 {
        return handles;
    }
    let right = rect.right() - 1;
    let bottom = rect.bottom() - 1;
    handles.push(ResizeHandle {
        rect: FloatRect::new(right, bottom, 1, 1),
        edge: ResizeEdge::BottomRight,
    });
    if rect.height > 2 {
        handles.push(ResizeHandle {
            rect: FloatRect::new(right, rect.y + 1, 1, rect.height - 2),
            edge: ResizeEdge::Right,
        });
    }
    if rect.width > 2 {
        handles.push(ResizeHandle {
            rect: FloatRect::new(rect.x + 1, bottom, rect.width - 2, 1),
            edge: ResizeEdge::Bottom,
        });
    }
    handles
}

pub fn resize_handle_at(rect: FloatRect, column: u16, row: u16) -> Option<ResizeEdge> {
    resize_handles_for_rect(rect)
        .into_iter()
        .find(|handle| handle.rect.contains(column, row))
        .map(|handle| handle.edge)
}

/// Size proposed by a resize gesture that moved `(dx, dy)` from its start.
///
/// Width and height never drop below `RESIZE_MIN_EXTENT`.
pub fn apply_resize_delta(start: FloatRect, edge: ResizeEdge, dx: i32, dy: i32) -> FloatRect {
    let min = RESIZE_MIN_EXTENT as i32;
    let max = u16::MAX as i32;
    let mut width = start.width as i32;
    let mut height = start.height as i32;
    if edge.grows_width() {
        width += dx;
    }
    if edge.grows_height() {
        height += dy;
    }
    FloatRect {
        width: width.clamp(min, max) as u16,
        height: height.clamp(min, max) as u16,
        ..start
    }
}

/// Rectangle proposed by a move gesture that moved `(dx, dy)` from its start.
pub fn apply_move_delta(start: FloatRect, dx: i32, dy: i32) -> FloatRect {
    start.translated(dx, dy)
}

/// Pointer delta between the gesture origin and the current position.
pub fn pointer_delta(origin: (u16, u16), column: u16, row: u16) -> (i32, i32) {
    (
        column as i32 - origin.0 as i32,
        row as i32 - origin.1 as i32,
    )
}
