//! Viewport-aware window geometry.
//!
//! Every function takes the viewport explicitly. Callers query it fresh from
//! the render surface on each call because the terminal may have been resized
//! since the last layout.

use ratatui::prelude::Rect;
use serde::Deserialize;

use crate::constants::{MAXIMIZE_EXTENT, POPUP_VIEWPORT_MARGIN};
use crate::window::FloatRect;

/// Layout policy applied when a window is placed or resized.
///
/// - `Window`: free-positioned; keeps the requested size when it fits and
///   moves the origin so the rectangle stays visible.
/// - `Popup`: always centered; shrinks the size to keep a visible margin
///   around the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryMode {
    #[default]
    Window,
    Popup,
}

/// Result of the popup-mode layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupLayout {
    pub width: u16,
    pub height: u16,
    pub top: i32,
    pub left: i32,
}

impl PopupLayout {
    pub fn rect(&self) -> FloatRect {
        FloatRect::new(self.left, self.top, self.width, self.height)
    }
}

/// Clamp `rect` so it is fully contained in `viewport`.
///
/// On an axis where the requested size exceeds the viewport, the size is
/// clamped to the viewport extent and the origin pinned to the viewport
/// origin. Otherwise the origin is moved back inside so the far edge does
/// not overflow.
pub fn fit_to_screen(viewport: Rect, rect: FloatRect) -> FloatRect {
    let (x, width) = fit_axis(viewport.x, viewport.width, rect.x, rect.width);
    let (y, height) = fit_axis(viewport.y, viewport.height, rect.y, rect.height);
    FloatRect {
        x,
        y,
        width,
        height,
    }
}

fn fit_axis(origin: u16, extent: u16, position: i32, size: u16) -> (i32, u16) {
    let origin = origin as i32;
    if size > extent {
        return (origin, extent);
    }
    let max = origin + (extent - size) as i32;
    (position.clamp(origin, max), size)
}

/// Clamp the far edges of `rect` to the viewport without moving its origin.
///
/// Used when committing a resize gesture, which only ever drags the right and
/// bottom edges. Neither axis drops below `min`; when the origin leaves less
/// room than that, this falls back to [`fit_to_screen`].
pub fn fit_size_at_origin(viewport: Rect, rect: FloatRect, min: u16) -> FloatRect {
    let room_x = viewport.right() as i32 - rect.x;
    let room_y = viewport.bottom() as i32 - rect.y;
    let origin_inside = rect.x >= viewport.x as i32 && rect.y >= viewport.y as i32;
    if !origin_inside || room_x < min as i32 || room_y < min as i32 {
        return fit_to_screen(viewport, rect);
    }
    FloatRect {
        width: rect.width.min(room_x as u16),
        height: rect.height.min(room_y as u16),
        ..rect
    }
}

/// Origin that centers a `width` x `height` window in the viewport.
pub fn center(viewport: Rect, width: u16, height: u16) -> (i32, i32) {
    let x = viewport.x as i32 + (viewport.width.saturating_sub(width) / 2) as i32;
    let y = viewport.y as i32 + (viewport.height.saturating_sub(height) / 2) as i32;
    (x, y)
}

/// Centered rectangle of the given size, clamped to the viewport.
pub fn centered_rect(viewport: Rect, width: u16, height: u16) -> FloatRect {
    let (x, y) = center(viewport, width, height);
    fit_to_screen(viewport, FloatRect::new(x, y, width, height))
}

/// Popup-mode layout: shrink the size to leave a margin, then center.
pub fn clamp_for_legacy_popup_mode(viewport: Rect, width: u16, height: u16) -> PopupLayout {
    let max_width = viewport.width.saturating_sub(POPUP_VIEWPORT_MARGIN);
    let max_height = viewport.height.saturating_sub(POPUP_VIEWPORT_MARGIN);
    let width = width.min(max_width);
    let height = height.min(max_height);
    let (left, top) = center(viewport, width, height);
    PopupLayout {
        width,
        height,
        top,
        left,
    }
}

/// Rectangle a maximized window occupies.
pub fn maximize_target(viewport: Rect) -> FloatRect {
    fit_to_screen(
        viewport,
        FloatRect::new(0, 0, MAXIMIZE_EXTENT, MAXIMIZE_EXTENT),
    )
}

/// Apply the layout policy of `mode` to a requested rectangle.
pub fn layout_rect(mode: GeometryMode, viewport: Rect, rect: FloatRect) -> FloatRect {
    match mode {
        GeometryMode::Window => fit_to_screen(viewport, rect),
        GeometryMode::Popup => clamp_for_legacy_popup_mode(viewport, rect.width, rect.height).rect(),
    }
}

/// Rectangle a maximized window occupies under `mode`.
pub fn maximized_rect(mode: GeometryMode, viewport: Rect) -> FloatRect {
    match mode {
        GeometryMode::Window => maximize_target(viewport),
        GeometryMode::Popup => {
            clamp_for_legacy_popup_mode(viewport, MAXIMIZE_EXTENT, MAXIMIZE_EXTENT).rect()
        }
    }
}

/// Whether `rect` lies entirely inside `viewport`.
pub fn contained_in(viewport: Rect, rect: FloatRect) -> bool {
    rect.x >= viewport.x as i32
        && rect.y >= viewport.y as i32
        && rect.right() <= viewport.x as i32 + viewport.width as i32
        && rect.bottom() <= viewport.y as i32 + viewport.height as i32
}
