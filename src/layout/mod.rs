pub mod floating;
pub mod geometry;

pub use geometry::{
    GeometryMode, PopupLayout, center, centered_rect, clamp_for_legacy_popup_mode, contained_in,
    fit_size_at_origin, fit_to_screen, layout_rect, maximize_target, maximized_rect,
};
