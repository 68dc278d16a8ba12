//! Drawing target for window chrome.
//!
//! Windows can sit partially off-screen (their origin is signed), so every
//! draw call made on behalf of a window is clipped here instead of at each
//! call site. Writing out-of-bounds into a ratatui `Buffer` panics.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

/// Frame area plus its buffer, with signed, clipped write helpers.
pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        Self {
            area,
            buffer: frame.buffer_mut(),
        }
    }

    /// Offscreen target, used by tests and snapshot rendering.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn visible(&self, bounds: Rect) -> Option<Rect> {
        let visible = bounds.intersection(self.area);
        (!visible.is_empty()).then_some(visible)
    }

    pub fn render_widget<W: Widget>(&mut self, widget: W, area: Rect) {
        if let Some(visible) = self.visible(area) {
            widget.render(visible, self.buffer);
        }
    }

    /// Write a single cell at a signed position, ignoring anything outside
    /// `bounds` or the frame.
    pub fn put_cell(&mut self, bounds: Rect, x: i32, y: i32, symbol: &str, style: Style) {
        let Some(clip) = self.visible(bounds) else {
            return;
        };
        if !spans(clip.x, clip.width, x) || !spans(clip.y, clip.height, y) {
            return;
        }
        if let Some(cell) = self.buffer.cell_mut((x as u16, y as u16)) {
            cell.set_symbol(symbol);
            cell.set_style(style);
        }
    }

    /// Write `text` starting at a signed position. Characters left of the
    /// visible area are skipped rather than shifting the string; characters
    /// past the right edge are dropped.
    pub fn put_str(&mut self, bounds: Rect, x: i32, y: i32, text: &str, style: Style) {
        let Some(clip) = self.visible(bounds) else {
            return;
        };
        if !spans(clip.y, clip.height, y) {
            return;
        }
        let left = clip.x as i32;
        let right = left + clip.width as i32;
        let start = x.max(left);
        if start >= right {
            return;
        }
        let skip = (left - x).max(0) as usize;
        let room = (right - start) as usize;
        let visible: String = text.chars().skip(skip).take(room).collect();
        self.buffer.set_string(start as u16, y as u16, visible, style);
    }
}

fn spans(origin: u16, extent: u16, at: i32) -> bool {
    at >= origin as i32 && at < origin as i32 + extent as i32
}

/// First `width` characters of `value`.
pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}
