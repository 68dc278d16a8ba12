//! Shared crate-wide constants.

use std::time::Duration;

/// Requested extent used as the maximize target.
///
/// Any realistic viewport is smaller, so `fit_to_screen` always degenerates
/// the maximize target to "fill the viewport".
pub const MAXIMIZE_EXTENT: u16 = u16::MAX;

/// Margin (in cells) kept free around a window laid out in popup mode.
pub const POPUP_VIEWPORT_MARGIN: u16 = 10;

/// Smallest width or height a resize gesture may produce.
pub const RESIZE_MIN_EXTENT: u16 = 10;

/// Smallest width or height of an auxiliary message panel.
pub const MESSAGE_MIN_EXTENT: u16 = 10;

/// Horizontal margin between a message panel and its window edges.
pub const MESSAGE_HORIZONTAL_MARGIN: u16 = 10;

/// Vertical margin between a message panel and its window bottom.
pub const MESSAGE_VERTICAL_MARGIN: u16 = 5;

/// Grace period added to every animated transition before its completion
/// fires, so the surface has finished painting the final frame.
pub const TRANSITION_GRACE: Duration = Duration::from_millis(50);

/// Longest transition a window may request. Larger speeds are clamped.
pub const MAX_TRANSITION: Duration = Duration::from_secs(60);

/// Two clicks on the same title bar within this window toggle maximize.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(500);

/// Prefix for generated window ids.
pub const GENERATED_ID_PREFIX: &str = "popup-";

/// Default window width (cells) when the caller does not provide one.
pub const DEFAULT_WIDTH: u16 = 450;

/// Default window height (cells) when the caller does not provide one.
pub const DEFAULT_HEIGHT: u16 = 250;
