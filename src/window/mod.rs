pub mod decorator;
pub mod focus_trap;
pub mod gesture;
pub mod messages;

mod animation;
mod instance;
mod window_manager;

use std::fmt;

use ratatui::prelude::Rect;

pub use instance::WindowInstance;
pub use window_manager::{ResizeDone, WindowManager};

/// Signed floating rectangle origin with unsigned size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let (c, r) = (column as i32, row as i32);
        c >= self.x && c < self.right() && r >= self.y && r < self.bottom()
    }

    /// Portion of the rectangle that lies inside `bounds`.
    pub fn visible_in(&self, bounds: Rect) -> Rect {
        let x0 = self.x.max(bounds.x as i32);
        let y0 = self.y.max(bounds.y as i32);
        let x1 = self.right().min(bounds.x as i32 + bounds.width as i32);
        let y1 = self.bottom().min(bounds.y as i32 + bounds.height as i32);
        if x1 <= x0 || y1 <= y0 {
            return Rect::default();
        }
        Rect {
            x: x0 as u16,
            y: y0 as u16,
            width: (x1 - x0) as u16,
            height: (y1 - y0) as u16,
        }
    }
}

impl From<Rect> for FloatRect {
    fn from(rect: Rect) -> Self {
        Self::new(rect.x as i32, rect.y as i32, rect.width, rect.height)
    }
}

/// Unique name of a window among live instances.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Lifecycle state of a window.
///
/// `Closed` is terminal for one lifecycle; a later `open` with the same id
/// starts a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStatus {
    Opening,
    Open,
    Moving,
    Resizing,
    Closing,
    Closed,
}

impl WindowStatus {
    /// Whether the window currently owns a materialized node.
    pub fn is_live(self) -> bool {
        !matches!(self, WindowStatus::Closed)
    }

    /// Whether a drag or resize gesture is in progress.
    pub fn in_gesture(self) -> bool {
        matches!(self, WindowStatus::Moving | WindowStatus::Resizing)
    }
}
