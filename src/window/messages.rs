//! Auxiliary message panels shown on top of a window body.

use crate::constants::{MESSAGE_HORIZONTAL_MARGIN, MESSAGE_MIN_EXTENT, MESSAGE_VERTICAL_MARGIN};
use crate::surface::MessageLayout;
use crate::window::FloatRect;

/// Requested panel size. Negative extents are relative to the parent:
/// `-4` wide means "parent width minus 4 on each side".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSpec {
    pub width: i32,
    pub height: i32,
    pub text: String,
}

impl MessageSpec {
    pub fn new(width: i32, height: i32, text: impl Into<String>) -> Self {
        Self {
            width,
            height,
            text: text.into(),
        }
    }
}

/// Lay a panel out against its parent window.
///
/// `title_height` is the number of rows above the body, border included.
pub fn layout_message(spec: &MessageSpec, parent: FloatRect, title_height: u16) -> MessageLayout {
    let parent_w = parent.width as i32;
    let parent_h = parent.height as i32;
    let title_h = title_height as i32;

    let mut width = spec.width;
    let mut height = spec.height;
    if width > parent_w - MESSAGE_HORIZONTAL_MARGIN as i32 {
        width = parent_w - MESSAGE_HORIZONTAL_MARGIN as i32;
    }
    if height > parent_h - title_h - MESSAGE_VERTICAL_MARGIN as i32 {
        height = parent_h - title_h - MESSAGE_VERTICAL_MARGIN as i32;
    }
    if spec.height < 0 {
        height = parent_h + spec.height - title_h;
    }
    if spec.width < 0 {
        width = parent_w + spec.width * 2;
    }
    let min = MESSAGE_MIN_EXTENT as i32;
    let width = width.clamp(min, u16::MAX as i32);
    let height = height.clamp(min, u16::MAX as i32);
    let left = (parent_w - width) / 2;

    MessageLayout {
        rect: FloatRect::new(parent.x + left, parent.y + title_h, width as u16, height as u16),
        text: spec.text.clone(),
    }
}

pub fn layout_messages(
    specs: &[MessageSpec],
    parent: FloatRect,
    title_height: u16,
) -> Vec<MessageLayout> {
    specs
        .iter()
        .map(|spec| layout_message(spec, parent, title_height))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_panel_is_clamped_and_centered() {
        let parent = FloatRect::new(10, 5, 60, 30);
        let layout = layout_message(&MessageSpec::new(200, 200, "hi"), parent, 2);
        assert_eq!(layout.rect.width, 50);
        assert_eq!(layout.rect.height, 23);
        assert_eq!(layout.rect.x, 15);
        assert_eq!(layout.rect.y, 7);
    }

    #[test]
    fn negative_extents_are_relative_to_parent() {
        let parent = FloatRect::new(0, 0, 60, 30);
        let layout = layout_message(&MessageSpec::new(-5, -4, "hi"), parent, 2);
        assert_eq!(layout.rect.width, 50);
        assert_eq!(layout.rect.height, 24);
        assert_eq!(layout.rect.x, 5);
    }

    #[test]
    fn tiny_panels_keep_minimum_extent() {
        let parent = FloatRect::new(0, 0, 60, 30);
        let layout = layout_message(&MessageSpec::new(2, 1, "hi"), parent, 2);
        assert_eq!((layout.rect.width, layout.rect.height), (10, 10));
        assert_eq!(layout.rect.x, 25);
    }
}
