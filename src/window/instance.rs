use crate::config::WindowConfig;
use crate::surface::{ElementRef, NodeHandle, VisualState, WindowContent};
use crate::window::gesture::GestureSession;
use crate::window::messages::MessageSpec;
use crate::window::{FloatRect, WindowId, WindowStatus};

/// One logical window, live or closed.
///
/// Closed instances stay registered so a later `open` with the same id can
/// layer new options over the previous configuration.
#[derive(Debug)]
pub struct WindowInstance {
    pub(crate) id: WindowId,
    pub(crate) config: WindowConfig,
    pub(crate) content: WindowContent,
    pub(crate) status: WindowStatus,
    pub(crate) rect: FloatRect,
    pub(crate) previous_rect: Option<FloatRect>,
    pub(crate) maximized: bool,
    pub(crate) auto_center: bool,
    pub(crate) node: Option<NodeHandle>,
    pub(crate) last_focus: Option<ElementRef>,
    pub(crate) gesture: Option<GestureSession>,
    pub(crate) visual: VisualState,
    pub(crate) messages: Vec<MessageSpec>,
    pub(crate) generation: u64,
    pub(crate) lock_seq: u64,
}

impl WindowInstance {
    pub(crate) fn new(id: WindowId) -> Self {
        Self {
            id,
            config: WindowConfig::default(),
            content: WindowContent::default(),
            status: WindowStatus::Closed,
            rect: FloatRect::default(),
            previous_rect: None,
            maximized: false,
            auto_center: true,
            node: None,
            last_focus: None,
            gesture: None,
            visual: VisualState::default(),
            messages: Vec::new(),
            generation: 0,
            lock_seq: 0,
        }
    }

    pub fn id(&self) -> &WindowId {
        &self.id
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn status(&self) -> WindowStatus {
        self.status
    }

    pub fn rect(&self) -> FloatRect {
        self.rect
    }

    /// Rectangle saved by `max`, restored by `min`.
    pub fn previous_rect(&self) -> Option<FloatRect> {
        self.previous_rect
    }

    pub fn is_maximized(&self) -> bool {
        self.maximized
    }

    /// False once the user positioned the window; viewport resizes then
    /// clamp it instead of re-centering.
    pub fn auto_center(&self) -> bool {
        self.auto_center
    }

    pub fn node(&self) -> Option<NodeHandle> {
        self.node
    }

    pub fn has_node(&self) -> bool {
        self.node.is_some()
    }

    pub fn is_locked(&self) -> bool {
        self.visual.lock.is_some()
    }

    pub fn gesture(&self) -> Option<&GestureSession> {
        self.gesture.as_ref()
    }

    pub fn messages(&self) -> &[MessageSpec] {
        &self.messages
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn content_from_config(config: &WindowConfig) -> WindowContent {
        WindowContent {
            title: config.title.clone(),
            body: config.body.clone(),
            body_centered: config.body_centered,
            buttons: config
                .actions
                .entries()
                .iter()
                .map(|action| crate::surface::ButtonSpec {
                    key: action.key.clone(),
                    label: action.label.clone(),
                    style: action.style.clone(),
                })
                .collect(),
            show_close: config.show_close,
            show_max: config.show_max,
            resizable: config.resizable,
            style: config.style.clone(),
        }
    }
}
