//! Render surface contract and the in-crate terminal implementation.
//!
//! The window manager never paints. It tells a [`RenderSurface`] which nodes
//! exist, where they are, what they show and which element holds focus.
//! [`TerminalSurface`] keeps that state in memory and paints it into a
//! ratatui buffer on demand, which also makes it the surface used by tests.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::prelude::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Clear;

use crate::config::StyleOverrides;
use crate::ui::UiFrame;
use crate::window::decorator::{OpenStepDecorator, WindowDecorator, chrome_layout};
use crate::window::{FloatRect, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelEdge {
    Leading,
    Trailing,
}

/// Reference to a focusable thing on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementRef {
    /// The host surface itself; focus resting here is never redirected.
    Body,
    /// Invisible focus stop before or after a window's controls.
    Sentinel(NodeHandle, SentinelEdge),
    /// The n-th focusable control of a node.
    Control(NodeHandle, usize),
    /// Something owned by the host application, outside every window.
    External(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focusable {
    pub element: ElementRef,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    pub key: String,
    pub label: String,
    pub style: Option<String>,
}

/// Everything a node displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowContent {
    pub title: String,
    pub body: String,
    pub body_centered: bool,
    pub buttons: Vec<ButtonSpec>,
    pub show_close: bool,
    pub show_max: bool,
    pub resizable: bool,
    pub style: StyleOverrides,
}

impl WindowContent {
    pub fn has_title_bar(&self) -> bool {
        !self.title.is_empty() || self.show_close || self.show_max
    }
}

/// Lock overlay covering a single window body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowLock {
    pub message: Option<String>,
    pub spinner: bool,
    /// Transparent locks only swallow input; nothing is painted.
    pub transparent: bool,
}

impl WindowLock {
    pub fn transparent() -> Self {
        Self {
            transparent: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualState {
    /// Offset applied on top of the node rectangle while dragging.
    pub translate: (i32, i32),
    pub lock: Option<WindowLock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    FadeIn,
    FadeOut,
    CrossFade,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLayout {
    pub rect: FloatRect,
    pub text: String,
}

pub trait RenderSurface: Any {
    /// Area available to windows. Queried on every layout.
    fn viewport(&self) -> Rect;

    /// Called when the host learns the viewport changed size.
    fn set_viewport(&mut self, _area: Rect) {}

    fn create_node(&mut self, id: &WindowId) -> NodeHandle;
    fn remove_node(&mut self, node: NodeHandle);
    fn has_node(&self, node: NodeHandle) -> bool;

    fn set_content(&mut self, node: NodeHandle, content: &WindowContent);
    fn set_rect(&mut self, node: NodeHandle, rect: FloatRect, transition: Duration);
    fn set_visual_state(&mut self, node: NodeHandle, state: &VisualState);
    fn set_messages(&mut self, node: NodeHandle, messages: &[MessageLayout]);

    /// Start a visual transition. Completion is tracked by the caller, which
    /// knows the duration it asked for.
    fn animate_transition(&mut self, node: NodeHandle, effect: TransitionEffect, duration: Duration);

    /// Focusable controls of a node, in tab order, sentinels excluded.
    fn focusables(&self, node: NodeHandle) -> Vec<Focusable>;
    fn focus(&mut self, element: &ElementRef);
    fn focused_element(&self) -> Option<ElementRef>;

    /// Show or hide the process-wide input-lock overlay.
    fn set_input_lock(&mut self, visible: bool);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Debug, Clone)]
pub struct NodeState {
    pub id: WindowId,
    pub rect: FloatRect,
    pub content: WindowContent,
    pub visual: VisualState,
    pub messages: Vec<MessageLayout>,
    pub transition: Option<(TransitionEffect, Instant, Duration)>,
}

impl NodeState {
    /// Rectangle the node is painted at, drag translation included.
    pub fn painted_rect(&self) -> FloatRect {
        self.rect
            .translated(self.visual.translate.0, self.visual.translate.1)
    }

    fn fading(&self, now: Instant) -> bool {
        self.transition
            .is_some_and(|(_, started, duration)| now.duration_since(started) < duration)
    }
}

pub struct TerminalSurface {
    viewport: Rect,
    nodes: BTreeMap<NodeHandle, NodeState>,
    next_node: u64,
    focused: Option<ElementRef>,
    input_lock: bool,
    decorator: Arc<dyn WindowDecorator>,
}

impl TerminalSurface {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            nodes: BTreeMap::new(),
            next_node: 0,
            focused: Some(ElementRef::Body),
            input_lock: false,
            decorator: Arc::new(OpenStepDecorator),
        }
    }

    pub fn with_decorator(mut self, decorator: Arc<dyn WindowDecorator>) -> Self {
        self.decorator = decorator;
        self
    }

    pub fn node(&self, node: NodeHandle) -> Option<&NodeState> {
        self.nodes.get(&node)
    }

    pub fn node_for(&self, id: &WindowId) -> Option<&NodeState> {
        self.nodes.values().find(|state| &state.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total nodes ever created, including removed ones.
    pub fn created_count(&self) -> u64 {
        self.next_node
    }

    pub fn input_lock_visible(&self) -> bool {
        self.input_lock
    }

    pub fn render(&self, frame: &mut UiFrame<'_>) {
        let area = frame.area().intersection(self.viewport);
        if area.width == 0 || area.height == 0 {
            return;
        }
        if self.input_lock {
            let dim = Style::default().add_modifier(Modifier::DIM);
            let buffer = frame.buffer_mut();
            for y in area.y..area.y.saturating_add(area.height) {
                for x in area.x..area.x.saturating_add(area.width) {
                    if let Some(cell) = buffer.cell_mut((x, y)) {
                        cell.set_style(dim);
                    }
                }
            }
        }
        let now = Instant::now();
        for (handle, state) in &self.nodes {
            let rect = state.painted_rect();
            let visible = rect.visible_in(area);
            if visible.width == 0 || visible.height == 0 {
                continue;
            }
            frame.render_widget(Clear, visible);
            let layout = chrome_layout(rect, &state.content);
            let focused = match &self.focused {
                Some(ElementRef::Control(node, idx)) if node == handle => Some(*idx),
                _ => None,
            };
            self.decorator.render_window(
                frame,
                &layout,
                &state.content,
                &state.visual,
                &state.messages,
                focused,
                state.fading(now),
                area,
            );
        }
    }
}

impl RenderSurface for TerminalSurface {
    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn set_viewport(&mut self, area: Rect) {
        self.viewport = area;
    }

    fn create_node(&mut self, id: &WindowId) -> NodeHandle {
        let handle = NodeHandle(self.next_node);
        self.next_node = self.next_node.saturating_add(1);
        self.nodes.insert(
            handle,
            NodeState {
                id: id.clone(),
                rect: FloatRect::default(),
                content: WindowContent::default(),
                visual: VisualState::default(),
                messages: Vec::new(),
                transition: None,
            },
        );
        handle
    }

    fn remove_node(&mut self, node: NodeHandle) {
        self.nodes.remove(&node);
        let owned = match &self.focused {
            Some(ElementRef::Control(owner, _)) | Some(ElementRef::Sentinel(owner, _)) => {
                *owner == node
            }
            _ => false,
        };
        if owned {
            self.focused = Some(ElementRef::Body);
        }
    }

    fn has_node(&self, node: NodeHandle) -> bool {
        self.nodes.contains_key(&node)
    }

    fn set_content(&mut self, node: NodeHandle, content: &WindowContent) {
        if let Some(state) = self.nodes.get_mut(&node) {
            state.content = content.clone();
        }
    }

    fn set_rect(&mut self, node: NodeHandle, rect: FloatRect, _transition: Duration) {
        if let Some(state) = self.nodes.get_mut(&node) {
            state.rect = rect;
        }
    }

    fn set_visual_state(&mut self, node: NodeHandle, visual: &VisualState) {
        if let Some(state) = self.nodes.get_mut(&node) {
            state.visual = visual.clone();
        }
    }

    fn set_messages(&mut self, node: NodeHandle, messages: &[MessageLayout]) {
        if let Some(state) = self.nodes.get_mut(&node) {
            state.messages = messages.to_vec();
        }
    }

    fn animate_transition(&mut self, node: NodeHandle, effect: TransitionEffect, duration: Duration) {
        if let Some(state) = self.nodes.get_mut(&node) {
            state.transition = Some((effect, Instant::now(), duration));
        }
    }

    fn focusables(&self, node: NodeHandle) -> Vec<Focusable> {
        self.nodes
            .get(&node)
            .map(|state| {
                state
                    .content
                    .buttons
                    .iter()
                    .enumerate()
                    .map(|(idx, button)| Focusable {
                        element: ElementRef::Control(node, idx),
                        name: button.key.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn focus(&mut self, element: &ElementRef) {
        self.focused = Some(element.clone());
    }

    fn focused_element(&self) -> Option<ElementRef> {
        self.focused.clone()
    }

    fn set_input_lock(&mut self, visible: bool) {
        self.input_lock = visible;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
