use ratatui::layout::Alignment;
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::layout::floating::{ResizeEdge, resize_handle_at};
use crate::surface::{MessageLayout, VisualState, WindowContent};
use crate::ui::{UiFrame, truncate_to_width};
use crate::window::FloatRect;

const CLOSE_GLYPH: &str = "[x]";
const MAX_GLYPH: &str = "[□]";
const BUTTON_GLYPH_WIDTH: u16 = 3;
const SPINNER: &str = "⠋";

/// Where the pieces of a window's chrome sit, in screen coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeLayout {
    pub outer: FloatRect,
    pub title: Option<FloatRect>,
    pub close_button: Option<FloatRect>,
    pub max_button: Option<FloatRect>,
    pub body: FloatRect,
    pub button_row: Option<FloatRect>,
    pub buttons: Vec<FloatRect>,
}

impl ChromeLayout {
    /// Rows taken by the title bar, top border included.
    pub fn title_height(&self) -> u16 {
        if self.title.is_some() { 2 } else { 1 }
    }
}

pub fn chrome_layout(rect: FloatRect, content: &WindowContent) -> ChromeLayout {
    let inner_width = rect.width.saturating_sub(2);
    let inner_height = rect.height.saturating_sub(2);
    let mut rows_left = inner_height;
    let mut body_top = rect.y + 1;

    let title = if content.has_title_bar() && rows_left > 0 {
        rows_left -= 1;
        body_top += 1;
        Some(FloatRect::new(rect.x + 1, rect.y + 1, inner_width, 1))
    } else {
        None
    };

    let mut close_button = None;
    let mut max_button = None;
    if let Some(title) = title {
        let mut slot = title.right();
        if content.show_close && title.width >= BUTTON_GLYPH_WIDTH {
            slot -= BUTTON_GLYPH_WIDTH as i32;
            close_button = Some(FloatRect::new(slot, title.y, BUTTON_GLYPH_WIDTH, 1));
        }
        if content.show_max && slot - (BUTTON_GLYPH_WIDTH as i32) >= title.x {
            slot -= BUTTON_GLYPH_WIDTH as i32;
            max_button = Some(FloatRect::new(slot, title.y, BUTTON_GLYPH_WIDTH, 1));
        }
    }

    let button_row = if !content.buttons.is_empty() && rows_left >= 2 {
        rows_left -= 1;
        Some(FloatRect::new(rect.x + 1, rect.bottom() - 2, inner_width, 1))
    } else {
        None
    };

    let buttons = button_row
        .map(|row| {
            let widths: Vec<u16> = content
                .buttons
                .iter()
                .map(|button| button.label.chars().count() as u16 + 4)
                .collect();
            let total: u16 = widths.iter().sum::<u16>() + widths.len().saturating_sub(1) as u16;
            let mut x = row.x + (row.width.saturating_sub(total) / 2) as i32;
            widths
                .into_iter()
                .map(|width| {
                    let button = FloatRect::new(x, row.y, width, 1);
                    x += width as i32 + 1;
                    button
                })
                .collect()
        })
        .unwrap_or_default();

    ChromeLayout {
        outer: rect,
        title,
        close_button,
        max_button,
        body: FloatRect::new(rect.x + 1, body_top, inner_width, rows_left),
        button_row,
        buttons,
    }
}

/// What a pointer position lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    Close,
    Maximize,
    Title,
    Button(usize),
    Resize(ResizeEdge),
    Body,
    Outside,
}

pub fn hit_test(layout: &ChromeLayout, resizable: bool, column: u16, row: u16) -> HitZone {
    if !layout.outer.contains(column, row) {
        return HitZone::Outside;
    }
    if resizable && let Some(edge) = resize_handle_at(layout.outer, column, row) {
        return HitZone::Resize(edge);
    }
    if layout.close_button.is_some_and(|r| r.contains(column, row)) {
        return HitZone::Close;
    }
    if layout.max_button.is_some_and(|r| r.contains(column, row)) {
        return HitZone::Maximize;
    }
    if let Some(idx) = layout.buttons.iter().position(|r| r.contains(column, row)) {
        return HitZone::Button(idx);
    }
    // the top border drags too
    if let Some(title) = layout.title
        && (title.contains(column, row) || row as i32 == layout.outer.y)
    {
        return HitZone::Title;
    }
    HitZone::Body
}

pub trait WindowDecorator: std::fmt::Debug {
    #[allow(clippy::too_many_arguments)]
    fn render_window(
        &self,
        frame: &mut UiFrame<'_>,
        layout: &ChromeLayout,
        content: &WindowContent,
        visual: &VisualState,
        messages: &[MessageLayout],
        focused_control: Option<usize>,
        fading: bool,
        bounds: Rect,
    );
}

#[derive(Debug)]
pub struct OpenStepDecorator;

impl OpenStepDecorator {
    fn paint_borders(&self, frame: &mut UiFrame<'_>, rect: FloatRect, style: Style, bounds: Rect) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let (left, top) = (rect.x, rect.y);
        let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);
        for x in left..=right {
            let (t, b) = if x == left {
                ("┌", "└")
            } else if x == right {
                ("┐", "┘")
            } else {
                ("─", "─")
            };
            frame.put_cell(bounds, x, top, t, style);
            frame.put_cell(bounds, x, bottom, b, style);
        }
        for y in top + 1..bottom {
            frame.put_cell(bounds, left, y, "│", style);
            frame.put_cell(bounds, right, y, "│", style);
        }
    }

    fn paint_header(
        &self,
        frame: &mut UiFrame<'_>,
        layout: &ChromeLayout,
        content: &WindowContent,
        style: Style,
        bounds: Rect,
    ) {
        let Some(title) = layout.title else {
            return;
        };
        for x in title.x..title.right() {
            frame.put_cell(bounds, x, title.y, " ", style);
        }
        let reserved = [layout.close_button, layout.max_button]
            .iter()
            .flatten()
            .count() as u16
            * BUTTON_GLYPH_WIDTH;
        let room = title.width.saturating_sub(reserved.saturating_mul(2));
        let text = truncate_to_width(&content.title, room as usize);
        let len = text.chars().count() as u16;
        let start = title.x + (title.width.saturating_sub(len) / 2) as i32;
        frame.put_str(bounds, start, title.y, &text, style);
        if let Some(close) = layout.close_button {
            frame.put_str(bounds, close.x, close.y, CLOSE_GLYPH, style);
        }
        if let Some(max) = layout.max_button {
            frame.put_str(bounds, max.x, max.y, MAX_GLYPH, style);
        }
    }

    fn paint_buttons(
        &self,
        frame: &mut UiFrame<'_>,
        layout: &ChromeLayout,
        content: &WindowContent,
        focused_control: Option<usize>,
        bounds: Rect,
    ) {
        for (idx, (rect, button)) in layout.buttons.iter().zip(&content.buttons).enumerate() {
            let mut style = match button.style.as_deref() {
                Some("primary") => Style::default().fg(Color::White).bg(Color::Blue),
                Some("danger") => Style::default().fg(Color::White).bg(Color::Red),
                _ => Style::default().fg(Color::Black).bg(Color::Gray),
            };
            if focused_control == Some(idx) {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            let label = format!("[ {} ]", button.label);
            frame.put_str(bounds, rect.x, rect.y, &label, style);
        }
    }

    fn paint_lock(&self, frame: &mut UiFrame<'_>, body: FloatRect, visual: &VisualState, bounds: Rect) {
        let Some(lock) = visual.lock.as_ref().filter(|lock| !lock.transparent) else {
            return;
        };
        let area = body.visible_in(bounds);
        let dim = Style::default().add_modifier(Modifier::DIM);
        for y in body.y..body.bottom() {
            for x in body.x..body.right() {
                frame.put_cell(bounds, x, y, " ", dim);
            }
        }
        let mut text = String::new();
        if lock.spinner {
            text.push_str(SPINNER);
            text.push(' ');
        }
        if let Some(message) = &lock.message {
            text.push_str(message);
        }
        if text.is_empty() || area.height == 0 {
            return;
        }
        let line = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(dim.remove_modifier(Modifier::DIM).add_modifier(Modifier::BOLD));
        let row = Rect {
            y: area.y + area.height / 2,
            height: 1,
            ..area
        };
        frame.render_widget(line, row);
    }
}

impl WindowDecorator for OpenStepDecorator {
    fn render_window(
        &self,
        frame: &mut UiFrame<'_>,
        layout: &ChromeLayout,
        content: &WindowContent,
        visual: &VisualState,
        messages: &[MessageLayout],
        focused_control: Option<usize>,
        fading: bool,
        bounds: Rect,
    ) {
        let mut header_style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let mut border_style = Style::default().fg(Color::DarkGray).bg(Color::Reset);
        if fading {
            header_style = header_style.add_modifier(Modifier::DIM);
            border_style = border_style.add_modifier(Modifier::DIM);
        }

        self.paint_header(frame, layout, content, header_style, bounds);
        self.paint_borders(frame, layout.outer, border_style, bounds);

        let body_area = layout.body.visible_in(bounds);
        if body_area.width > 0 && body_area.height > 0 {
            let alignment = if content.body_centered {
                Alignment::Center
            } else {
                Alignment::Left
            };
            let paragraph = Paragraph::new(content.body.as_str())
                .style(content.style.to_style())
                .alignment(alignment)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, body_area);
        }

        self.paint_buttons(frame, layout, content, focused_control, bounds);

        for message in messages {
            let area = message.rect.visible_in(bounds);
            if area.width == 0 || area.height == 0 {
                continue;
            }
            frame.render_widget(Clear, area);
            let panel = Paragraph::new(message.text.as_str())
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(panel, area);
        }

        self.paint_lock(frame, layout.body, visual, bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::ButtonSpec;

    fn content() -> WindowContent {
        WindowContent {
            title: "Title".into(),
            show_close: true,
            show_max: true,
            buttons: vec![
                ButtonSpec {
                    key: "ok".into(),
                    label: "Ok".into(),
                    style: None,
                },
                ButtonSpec {
                    key: "cancel".into(),
                    label: "Cancel".into(),
                    style: None,
                },
            ],
            ..WindowContent::default()
        }
    }

    #[test]
    fn layout_places_title_body_and_buttons() {
        let layout = chrome_layout(FloatRect::new(10, 5, 40, 12), &content());
        assert_eq!(layout.title, Some(FloatRect::new(11, 6, 38, 1)));
        assert_eq!(layout.close_button, Some(FloatRect::new(46, 6, 3, 1)));
        assert_eq!(layout.max_button, Some(FloatRect::new(43, 6, 3, 1)));
        assert_eq!(layout.button_row, Some(FloatRect::new(11, 15, 38, 1)));
        assert_eq!(layout.body, FloatRect::new(11, 7, 38, 8));
        assert_eq!(layout.buttons.len(), 2);
        assert_eq!(layout.title_height(), 2);
    }

    #[test]
    fn untitled_window_without_buttons_has_no_title_bar() {
        let content = WindowContent::default();
        let layout = chrome_layout(FloatRect::new(0, 0, 20, 6), &content);
        assert!(layout.title.is_none());
        assert_eq!(layout.body, FloatRect::new(1, 1, 18, 4));
        assert_eq!(layout.title_height(), 1);
    }

    #[test]
    fn hit_test_resolves_chrome_zones() {
        let layout = chrome_layout(FloatRect::new(10, 5, 40, 12), &content());
        assert_eq!(hit_test(&layout, false, 47, 6), HitZone::Close);
        assert_eq!(hit_test(&layout, false, 44, 6), HitZone::Maximize);
        assert_eq!(hit_test(&layout, false, 20, 6), HitZone::Title);
        assert_eq!(hit_test(&layout, false, 20, 5), HitZone::Title);
        assert_eq!(hit_test(&layout, false, 20, 9), HitZone::Body);
        assert_eq!(hit_test(&layout, false, 0, 0), HitZone::Outside);
        let first = layout.buttons[0];
        assert_eq!(
            hit_test(&layout, false, first.x as u16, first.y as u16),
            HitZone::Button(0)
        );
    }

    #[test]
    fn resize_handles_only_when_resizable() {
        let layout = chrome_layout(FloatRect::new(10, 5, 40, 12), &content());
        assert_eq!(hit_test(&layout, false, 49, 16), HitZone::Body);
        assert_eq!(
            hit_test(&layout, true, 49, 16),
            HitZone::Resize(ResizeEdge::BottomRight)
        );
    }
}
