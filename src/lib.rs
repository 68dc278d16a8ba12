//! Floating, movable and resizable popup windows for terminal UIs.
//!
//! [`window::WindowManager`] owns every window and drives its lifecycle
//! (`open`, `close`, `max`, `min`, `toggle`, `resize`, drag and resize
//! gestures). Each transition is announced through a cancellable
//! [`events::EventPipeline`] before anything changes. Painting is delegated
//! to a [`surface::RenderSurface`]; [`surface::TerminalSurface`] renders into
//! a ratatui buffer.

pub mod config;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod events;
pub mod layout;
pub mod loader;
pub mod lock;
pub mod surface;
pub mod tracing_sub;
pub mod ui;
pub mod window;

pub use config::{ActionEvent, ActionHandler, FocusTarget, WindowConfig, WindowOptions};
pub use error::PopupError;
pub use events::{EventDatum, EventDetail, EventKind, Phase};
pub use window::{FloatRect, WindowId, WindowManager, WindowStatus};
