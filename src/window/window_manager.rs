use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::prelude::Rect;

use super::animation::{AnimationQueue, Completion, PendingCompletion};
use super::decorator::{HitZone, chrome_layout, hit_test};
use super::focus_trap::FocusTrap;
use super::gesture::{GestureKind, GestureSession};
use super::instance::WindowInstance;
use super::messages::{MessageSpec, layout_messages};
use super::{FloatRect, WindowId, WindowStatus};
use crate::config::{ActionEvent, FocusTarget, WindowConfig, WindowOptions};
use crate::constants::{
    DOUBLE_CLICK_WINDOW, GENERATED_ID_PREFIX, RESIZE_MIN_EXTENT, TRANSITION_GRACE,
};
use crate::error::PopupError;
use crate::events::{EventDatum, EventDetail, EventKind, EventPipeline, ObserverId, Phase};
use crate::layout::floating::ResizeEdge;
use crate::layout::{
    GeometryMode, centered_rect, fit_size_at_origin, fit_to_screen, layout_rect, maximized_rect,
};
use crate::loader::{ContentLoader, LoadRequest, resolve_request};
use crate::lock::InputLock;
use crate::surface::{
    ElementRef, RenderSurface, TerminalSurface, TransitionEffect, VisualState, WindowContent,
    WindowLock,
};
use crate::ui::UiFrame;

/// Called once a `resize` transition has been applied.
pub type ResizeDone = Box<dyn FnOnce(&mut WindowManager, &WindowId)>;

/// Owning registry of windows and the single place their state changes.
pub struct WindowManager {
    surface: Box<dyn RenderSurface>,
    windows: BTreeMap<WindowId, WindowInstance>,
    /// Open order; the last entry is topmost.
    stack: Vec<WindowId>,
    events: EventPipeline,
    input_lock: InputLock,
    animations: AnimationQueue,
    next_generated: u64,
    active_gesture: Option<WindowId>,
    last_title_click: Option<(WindowId, Instant)>,
}

impl WindowManager {
    pub fn new(surface: impl RenderSurface) -> Self {
        Self {
            surface: Box::new(surface),
            windows: BTreeMap::new(),
            stack: Vec::new(),
            events: EventPipeline::new(),
            input_lock: InputLock::new(),
            animations: AnimationQueue::default(),
            next_generated: 0,
            active_gesture: None,
            last_title_click: None,
        }
    }

    pub fn with_terminal(viewport: Rect) -> Self {
        Self::new(TerminalSurface::new(viewport))
    }

    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> &mut dyn RenderSurface {
        self.surface.as_mut()
    }

    pub fn surface_as<T: 'static>(&self) -> Option<&T> {
        self.surface.as_any().downcast_ref::<T>()
    }

    pub fn surface_as_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.surface.as_any_mut().downcast_mut::<T>()
    }

    pub fn window(&self, id: &WindowId) -> Option<&WindowInstance> {
        self.windows.get(id)
    }

    pub fn windows(&self) -> impl Iterator<Item = &WindowInstance> {
        self.windows.values()
    }

    pub fn live_count(&self) -> usize {
        self.windows
            .values()
            .filter(|window| window.status.is_live())
            .count()
    }

    /// Topmost window that still accepts input.
    pub fn topmost(&self) -> Option<&WindowId> {
        self.stack.iter().rev().find(|id| {
            self.windows.get(*id).is_some_and(|window| {
                window.node.is_some()
                    && !matches!(window.status, WindowStatus::Closing | WindowStatus::Closed)
            })
        })
    }

    pub fn input_lock(&self) -> &InputLock {
        &self.input_lock
    }

    pub fn pending_completions(&self) -> usize {
        self.animations.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.animations.next_deadline()
    }

    pub fn on<F>(&mut self, kind: EventKind, phase: Phase, observer: F) -> ObserverId
    where
        F: FnMut(&mut EventDatum) + 'static,
    {
        self.events.on(kind, phase, observer)
    }

    pub fn off(&mut self, observer: ObserverId) -> bool {
        self.events.off(observer)
    }

    /// Paint every window when the surface is the built-in terminal one.
    pub fn render(&self, frame: &mut UiFrame<'_>) {
        if let Some(surface) = self.surface_as::<TerminalSurface>() {
            surface.render(frame);
        }
    }

    fn generate_id(&mut self) -> WindowId {
        loop {
            let id = WindowId::new(format!("{GENERATED_ID_PREFIX}{}", self.next_generated));
            self.next_generated = self.next_generated.saturating_add(1);
            if !self.windows.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn open(&mut self, mut options: WindowOptions) -> WindowId {
        let id = match options.name.take() {
            Some(name) => WindowId::new(name),
            None => self.generate_id(),
        };

        if self
            .windows
            .get(&id)
            .is_some_and(|window| window.status == WindowStatus::Closing)
        {
            tracing::debug!(window_id = %id, "reopening a closing window; finishing close first");
            self.close(&id, true);
        }

        if let Some(existing) = self.windows.get(&id)
            && existing.node.is_some()
        {
            match options.mode.unwrap_or(existing.config.mode) {
                GeometryMode::Popup => self.swap_content(&id, options),
                GeometryMode::Window => {
                    tracing::warn!(window_id = %id, "window already exists");
                }
            }
            return id;
        }

        let previous = self
            .windows
            .get(&id)
            .map(|window| window.config.clone())
            .unwrap_or_default();
        let config = previous.merged(options);
        let (rect, auto_center) = initial_rect(&config, self.surface.viewport());

        let datum = self
            .events
            .trigger(EventKind::Open, &id, EventDetail::Open { present: false });
        if datum.is_cancelled() {
            return id;
        }

        let last_focus = self.surface.focused_element();
        let node = self.surface.create_node(&id);
        let content = WindowInstance::content_from_config(&config);
        self.surface.set_content(node, &content);
        self.surface.set_rect(node, rect, Duration::ZERO);
        self.surface.set_messages(node, &[]);
        let speed = config.speed;

        let instance = self
            .windows
            .entry(id.clone())
            .or_insert_with(|| WindowInstance::new(id.clone()));
        instance.generation += 1;
        instance.config = config;
        instance.content = content;
        instance.status = WindowStatus::Opening;
        instance.rect = rect;
        instance.previous_rect = None;
        instance.maximized = false;
        instance.auto_center = auto_center;
        instance.node = Some(node);
        instance.last_focus = last_focus;
        instance.gesture = None;
        instance.visual = VisualState::default();
        instance.messages.clear();

        self.stack.retain(|other| other != &id);
        self.stack.push(id.clone());
        self.acquire_input_lock(&id);
        tracing::debug!(window_id = %id, ?rect, "opened window");

        if !speed.is_zero() {
            self.surface
                .animate_transition(node, TransitionEffect::FadeIn, speed);
        }
        self.complete_or_schedule(&id, speed, Completion::Opened, Some(datum));
        id
    }

    /// Resolve a content request and open a window with it. Nothing changes
    /// when the request is rejected.
    pub fn load(
        &mut self,
        loader: &dyn ContentLoader,
        request: LoadRequest,
    ) -> Result<WindowId, PopupError> {
        let options = resolve_request(loader, request)?;
        Ok(self.open(options))
    }

    /// Reopening a popup-mode window replaces its content in place.
    fn swap_content(&mut self, id: &WindowId, options: WindowOptions) {
        let datum = self
            .events
            .trigger(EventKind::Open, id, EventDetail::Open { present: true });
        if datum.is_cancelled() {
            return;
        }
        let viewport = self.surface.viewport();
        let Some(instance) = self.windows.get_mut(id) else {
            return;
        };
        let Some(node) = instance.node else {
            return;
        };
        let old_size = (instance.config.width, instance.config.height);
        let config = instance.config.merged(options);
        let resized = (config.width, config.height) != old_size && !instance.maximized;
        let speed = config.speed;
        if resized {
            instance.rect = layout_rect(
                config.mode,
                viewport,
                FloatRect::new(instance.rect.x, instance.rect.y, config.width, config.height),
            );
        }
        let content = WindowInstance::content_from_config(&config);
        let focus = config.focus.clone();
        instance.config = config;
        instance.content = content.clone();
        let rect = instance.rect;

        if !speed.is_zero() {
            self.surface
                .animate_transition(node, TransitionEffect::CrossFade, speed);
        }
        self.surface.set_content(node, &content);
        if resized {
            self.surface.set_rect(node, rect, speed);
        }
        self.sync_messages(id);
        self.set_focus(id, focus.as_ref());
        self.complete_or_schedule(id, speed, Completion::ContentSwapped, Some(datum));
    }

    pub fn close(&mut self, id: &WindowId, immediate: bool) {
        let Some(instance) = self.windows.get(id) else {
            tracing::debug!(window_id = %id, "close on unknown window");
            return;
        };
        let mut immediate = immediate;
        match instance.status {
            WindowStatus::Closed => {
                tracing::debug!(window_id = %id, "window already closed");
                return;
            }
            WindowStatus::Closing => {
                if immediate
                    && let Some(pending) = self
                        .animations
                        .take_for(id, |completion| matches!(completion, Completion::Closed))
                {
                    self.teardown(id, pending.datum);
                }
                return;
            }
            WindowStatus::Opening => immediate = true,
            _ => {}
        }
        let speed = instance.config.speed;

        let datum = self.events.trigger(EventKind::Close, id, EventDetail::None);
        if datum.is_cancelled() {
            return;
        }
        self.abort_gesture(id);

        if immediate || speed.is_zero() {
            self.teardown(id, Some(datum));
            return;
        }
        let Some(instance) = self.windows.get_mut(id) else {
            return;
        };
        instance.status = WindowStatus::Closing;
        if let Some(node) = instance.node {
            self.surface
                .animate_transition(node, TransitionEffect::FadeOut, speed);
        }
        self.schedule(id, speed, Completion::Closed, Some(datum));
    }

    /// Close immediately and forget the window, previous configuration
    /// included.
    pub fn destroy(&mut self, id: &WindowId) {
        self.close(id, true);
        if self
            .windows
            .get(id)
            .is_some_and(|window| window.status == WindowStatus::Closed)
        {
            self.windows.remove(id);
            tracing::debug!(window_id = %id, "destroyed window");
        }
    }

    fn teardown(&mut self, id: &WindowId, datum: Option<EventDatum>) {
        let Some(instance) = self.windows.get_mut(id) else {
            return;
        };
        match instance.node.take() {
            Some(node) => self.surface.remove_node(node),
            None => tracing::debug!(window_id = %id, "teardown without a node"),
        }
        instance.status = WindowStatus::Closed;
        instance.generation += 1;
        instance.gesture = None;
        instance.maximized = false;
        instance.previous_rect = None;
        instance.visual = VisualState::default();
        instance.messages.clear();
        let last_focus = instance.last_focus.take();

        let discarded = self.animations.discard_window(id);
        if discarded > 0 {
            tracing::debug!(window_id = %id, discarded, "dropped pending completions");
        }
        self.stack.retain(|other| other != id);
        if self.active_gesture.as_ref() == Some(id) {
            self.active_gesture = None;
        }
        if let Some(element) = last_focus {
            self.surface.focus(&element);
        }
        self.release_input_lock(id);
        tracing::debug!(window_id = %id, "closed window");
        if let Some(datum) = datum {
            self.events.finish(datum);
        }
    }

    pub fn toggle(&mut self, id: &WindowId) {
        let Some(instance) = self.windows.get(id) else {
            return;
        };
        if instance.status != WindowStatus::Open {
            tracing::debug!(window_id = %id, status = ?instance.status, "toggle ignored");
            return;
        }
        let maximized = instance.maximized;
        let speed = instance.config.speed;
        let datum = self.events.trigger(EventKind::Toggle, id, EventDetail::None);
        if datum.is_cancelled() {
            return;
        }
        if maximized {
            self.min(id);
        } else {
            self.max(id);
        }
        self.complete_or_schedule(id, speed, Completion::Toggled, Some(datum));
    }

    pub fn max(&mut self, id: &WindowId) {
        let viewport = self.surface.viewport();
        let Some(instance) = self.windows.get(id) else {
            return;
        };
        if instance.maximized || instance.status != WindowStatus::Open {
            tracing::debug!(window_id = %id, "max ignored");
            return;
        }
        let datum = self.events.trigger(EventKind::Max, id, EventDetail::None);
        if datum.is_cancelled() {
            return;
        }
        let Some(instance) = self.windows.get_mut(id) else {
            return;
        };
        instance.previous_rect = Some(instance.rect);
        instance.status = WindowStatus::Resizing;
        let speed = instance.config.speed;
        let target = maximized_rect(instance.config.mode, viewport);
        self.apply_rect(id, target, speed);
        self.complete_or_schedule(id, speed, Completion::Maximized, Some(datum));
    }

    pub fn min(&mut self, id: &WindowId) {
        let viewport = self.surface.viewport();
        let Some(instance) = self.windows.get(id) else {
            return;
        };
        if !instance.maximized || instance.status != WindowStatus::Open {
            tracing::debug!(window_id = %id, "min ignored");
            return;
        }
        let datum = self.events.trigger(EventKind::Min, id, EventDetail::None);
        if datum.is_cancelled() {
            return;
        }
        let Some(instance) = self.windows.get_mut(id) else {
            return;
        };
        instance.status = WindowStatus::Resizing;
        let speed = instance.config.speed;
        let saved = instance.previous_rect.unwrap_or(instance.rect);
        let target = layout_rect(instance.config.mode, viewport, saved);
        self.apply_rect(id, target, speed);
        self.complete_or_schedule(id, speed, Completion::Restored, Some(datum));
    }

    pub fn resize(
        &mut self,
        id: &WindowId,
        x: i32,
        y: i32,
        width: u16,
        height: u16,
        on_done: Option<ResizeDone>,
    ) {
        let viewport = self.surface.viewport();
        let Some(instance) = self.windows.get(id) else {
            return;
        };
        if instance.status != WindowStatus::Open {
            tracing::debug!(window_id = %id, status = ?instance.status, "resize ignored");
            return;
        }
        let rect = layout_rect(
            instance.config.mode,
            viewport,
            FloatRect::new(x, y, width, height),
        );
        let datum = self
            .events
            .trigger(EventKind::Resize, id, EventDetail::Rect(rect));
        if datum.is_cancelled() {
            return;
        }
        let Some(instance) = self.windows.get_mut(id) else {
            return;
        };
        instance.status = WindowStatus::Resizing;
        instance.config.width = rect.width;
        instance.config.height = rect.height;
        let speed = instance.config.speed;
        self.apply_rect(id, rect, speed);
        self.complete_or_schedule(id, speed, Completion::Resized(on_done), Some(datum));
    }

    pub fn action(&mut self, id: &WindowId, name: &str, source: Option<Event>) {
        let Some(instance) = self.windows.get(id) else {
            tracing::debug!(window_id = %id, action = name, "action on unknown window");
            return;
        };
        let resolved = instance.config.actions.get(name);
        let callback = resolved.and_then(|action| action.callback.clone());
        let action_name = resolved
            .map(|action| action.name.clone())
            .unwrap_or_else(|| name.to_string());
        let datum = self.events.trigger(
            EventKind::Action,
            id,
            EventDetail::Action {
                name: action_name.clone(),
            },
        );
        if datum.is_cancelled() {
            return;
        }
        match callback {
            Some(callback) => {
                let event = ActionEvent {
                    window: id.clone(),
                    action: action_name,
                    source,
                };
                callback(self, &event);
            }
            None => tracing::debug!(window_id = %id, action = name, "no handler for action"),
        }
        self.events.finish(datum);
    }

    pub fn keydown(&mut self, id: &WindowId, key: KeyEvent) {
        let Some(instance) = self.windows.get(id) else {
            return;
        };
        if !instance.config.keyboard || !instance.status.is_live() {
            return;
        }
        let datum = self
            .events
            .trigger(EventKind::Keydown, id, EventDetail::Key(key));
        if datum.is_cancelled() {
            return;
        }
        if key.code == KeyCode::Esc
            && let Some(instance) = self.windows.get(id)
        {
            if !instance.messages.is_empty() {
                tracing::debug!(window_id = %id, "escape ignored while a message is shown");
            } else {
                match instance.config.cancel_action.clone() {
                    Some(name) => self.action(id, &name, Some(Event::Key(key))),
                    None => self.close(id, false),
                }
            }
        }
        self.events.finish(datum);
    }

    /// Focus a control of the window, or park focus on its leading sentinel
    /// when `target` is `None`. Returns false when nothing matched.
    pub fn set_focus(&mut self, id: &WindowId, target: Option<&FocusTarget>) -> bool {
        let Some(node) = self.windows.get(id).and_then(|window| window.node) else {
            return false;
        };
        let focusables = self.surface.focusables(node);
        match FocusTrap::new(node).initial(target, &focusables) {
            Some(element) => {
                self.surface.focus(&element);
                true
            }
            None => {
                tracing::debug!(window_id = %id, ?target, "focus target matched nothing");
                false
            }
        }
    }

    /// Pull focus back into the topmost window after it moved away from one
    /// of the window's elements.
    pub fn handle_focus_change(&mut self) -> bool {
        let Some(node) = self
            .topmost()
            .and_then(|id| self.windows.get(id))
            .and_then(|window| window.node)
        else {
            return false;
        };
        let focusables = self.surface.focusables(node);
        let focused = self.surface.focused_element();
        match FocusTrap::new(node).redirect(focused.as_ref(), &focusables) {
            Some(element) => {
                self.surface.focus(&element);
                true
            }
            None => false,
        }
    }

    fn cycle_focus(&mut self, id: &WindowId, forward: bool) {
        let Some(node) = self.windows.get(id).and_then(|window| window.node) else {
            return;
        };
        let focusables = self.surface.focusables(node);
        let trap = FocusTrap::new(node);
        let focused = self.surface.focused_element();
        let stop = trap.step(focused.as_ref(), &focusables, forward);
        self.surface.focus(&stop);
        if let Some(element) = trap.redirect(Some(&stop), &focusables) {
            self.surface.focus(&element);
        }
    }

    /// Cover the window body with a lock overlay.
    pub fn lock(&mut self, id: &WindowId, message: Option<&str>, spinner: bool) {
        let Some(instance) = self.windows.get_mut(id) else {
            return;
        };
        let Some(node) = instance.node else {
            tracing::debug!(window_id = %id, "lock on a window without a node");
            return;
        };
        instance.lock_seq += 1;
        instance.visual.lock = Some(WindowLock {
            message: message.map(str::to_string),
            spinner,
            transparent: false,
        });
        self.surface.set_visual_state(node, &instance.visual);
    }

    pub fn unlock(&mut self, id: &WindowId, speed: Duration) {
        let Some(instance) = self.windows.get(id) else {
            return;
        };
        if instance.visual.lock.is_none() {
            return;
        }
        let seq = instance.lock_seq;
        if speed.is_zero() {
            self.clear_lock(id, seq);
        } else {
            self.schedule(id, speed, Completion::Unlocked(seq), None);
        }
    }

    fn clear_lock(&mut self, id: &WindowId, seq: u64) {
        let Some(instance) = self.windows.get_mut(id) else {
            return;
        };
        if instance.lock_seq != seq {
            tracing::debug!(window_id = %id, "window was relocked; keeping lock");
            return;
        }
        instance.visual.lock = None;
        if let Some(node) = instance.node {
            self.surface.set_visual_state(node, &instance.visual);
        }
    }

    pub fn add_message(&mut self, id: &WindowId, message: MessageSpec) -> bool {
        let Some(instance) = self.windows.get_mut(id) else {
            return false;
        };
        if instance.node.is_none() {
            return false;
        }
        instance.messages.push(message);
        self.sync_messages(id);
        true
    }

    pub fn clear_messages(&mut self, id: &WindowId) {
        if let Some(instance) = self.windows.get_mut(id) {
            instance.messages.clear();
            self.sync_messages(id);
        }
    }

    /// Empty the title, body and button row. The chrome stays.
    pub fn clear(&mut self, id: &WindowId) {
        let Some(instance) = self.windows.get_mut(id) else {
            return;
        };
        instance.content = WindowContent {
            title: String::new(),
            body: String::new(),
            buttons: Vec::new(),
            ..instance.content.clone()
        };
        if let Some(node) = instance.node {
            self.surface.set_content(node, &instance.content);
        }
    }

    pub fn begin_drag(&mut self, id: &WindowId, column: u16, row: u16) -> bool {
        self.begin_gesture(id, None, column, row)
    }

    pub fn begin_resize(&mut self, id: &WindowId, edge: ResizeEdge, column: u16, row: u16) -> bool {
        let resizable = self
            .windows
            .get(id)
            .is_some_and(|window| window.config.resizable);
        if !resizable {
            return false;
        }
        self.begin_gesture(id, Some(edge), column, row)
    }

    fn begin_gesture(&mut self, id: &WindowId, edge: Option<ResizeEdge>, column: u16, row: u16) -> bool {
        if self.active_gesture.is_some() {
            return false;
        }
        let Some(instance) = self.windows.get_mut(id) else {
            return false;
        };
        if instance.maximized || instance.status != WindowStatus::Open || instance.gesture.is_some() {
            tracing::debug!(window_id = %id, status = ?instance.status, "gesture ignored");
            return false;
        }
        let Some(node) = instance.node else {
            return false;
        };
        let locked = instance.visual.lock.is_some();
        let (session, status) = match edge {
            None => (
                GestureSession::drag((column, row), instance.rect, locked),
                WindowStatus::Moving,
            ),
            Some(edge) => (
                GestureSession::resize(edge, (column, row), instance.rect, locked),
                WindowStatus::Resizing,
            ),
        };
        instance.gesture = Some(session);
        instance.status = status;
        if !locked {
            instance.visual.lock = Some(WindowLock::transparent());
            self.surface.set_visual_state(node, &instance.visual);
        }
        self.active_gesture = Some(id.clone());
        true
    }

    fn session(&self, id: &WindowId, move_gesture: bool) -> Option<GestureSession> {
        self.windows
            .get(id)
            .and_then(|window| window.gesture)
            .filter(|session| (session.kind() == GestureKind::Move) == move_gesture)
    }

    pub fn drag_to(&mut self, id: &WindowId, column: u16, row: u16) {
        let Some(session) = self.session(id, true) else {
            return;
        };
        let proposed = session.propose(column, row);
        let datum = self
            .events
            .trigger(EventKind::Moving, id, EventDetail::Rect(proposed));
        if datum.is_cancelled() {
            return;
        }
        if let Some(instance) = self.windows.get_mut(id)
            && let Some(node) = instance.node
        {
            // translation only; layout is committed on release
            instance.visual.translate = session.delta(column, row);
            self.surface.set_visual_state(node, &instance.visual);
        }
        self.events.finish(datum);
    }

    pub fn end_drag(&mut self, id: &WindowId, column: u16, row: u16) {
        let Some(session) = self.session(id, true) else {
            return;
        };
        let committed = fit_to_screen(self.surface.viewport(), session.propose(column, row));
        self.finish_gesture(id, session, committed);
        if let Some(instance) = self.windows.get_mut(id)
            && committed != session.start_rect()
        {
            instance.auto_center = false;
        }
        let datum = self
            .events
            .trigger(EventKind::Moved, id, EventDetail::Rect(committed));
        self.events.finish(datum);
    }

    pub fn resize_to(&mut self, id: &WindowId, column: u16, row: u16) {
        let Some(session) = self.session(id, false) else {
            return;
        };
        let proposed = fit_size_at_origin(
            self.surface.viewport(),
            session.propose(column, row),
            RESIZE_MIN_EXTENT,
        );
        let datum = self
            .events
            .trigger(EventKind::Resizing, id, EventDetail::Rect(proposed));
        if datum.is_cancelled() {
            return;
        }
        if let Some(instance) = self.windows.get(id)
            && let Some(node) = instance.node
        {
            let title_height = chrome_layout(proposed, &instance.content).title_height();
            let messages = layout_messages(&instance.messages, proposed, title_height);
            self.surface.set_rect(node, proposed, Duration::ZERO);
            self.surface.set_messages(node, &messages);
        }
        self.events.finish(datum);
    }

    pub fn end_resize(&mut self, id: &WindowId, column: u16, row: u16) {
        let Some(session) = self.session(id, false) else {
            return;
        };
        let committed = fit_size_at_origin(
            self.surface.viewport(),
            session.propose(column, row),
            RESIZE_MIN_EXTENT,
        );
        self.finish_gesture(id, session, committed);
        if let Some(instance) = self.windows.get_mut(id) {
            instance.config.width = committed.width;
            instance.config.height = committed.height;
            if !instance.config.keep_centered && committed != session.start_rect() {
                instance.auto_center = false;
            }
        }
        let datum = self
            .events
            .trigger(EventKind::Resized, id, EventDetail::Rect(committed));
        self.events.finish(datum);
    }

    fn finish_gesture(&mut self, id: &WindowId, session: GestureSession, committed: FloatRect) {
        if let Some(instance) = self.windows.get_mut(id) {
            instance.gesture = None;
            instance.status = WindowStatus::Open;
            instance.visual.translate = (0, 0);
            if session.acquired_lock() {
                instance.visual.lock = None;
            }
            if let Some(node) = instance.node {
                self.surface.set_visual_state(node, &instance.visual);
            }
        }
        if self.active_gesture.as_ref() == Some(id) {
            self.active_gesture = None;
        }
        self.apply_rect(id, committed, Duration::ZERO);
    }

    /// Drop an in-flight gesture without committing it.
    fn abort_gesture(&mut self, id: &WindowId) {
        let Some(session) = self.windows.get(id).and_then(|window| window.gesture) else {
            return;
        };
        tracing::debug!(window_id = %id, "aborting gesture");
        self.finish_gesture(id, session, session.start_rect());
    }

    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Resize(width, height) => {
                let area = Rect {
                    width: *width,
                    height: *height,
                    ..self.surface.viewport()
                };
                self.surface.set_viewport(area);
                self.handle_viewport_resize();
                false
            }
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(event, *mouse),
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(id) = self.topmost().cloned() else {
            return false;
        };
        match key.code {
            KeyCode::Tab => {
                let forward = !key.modifiers.contains(KeyModifiers::SHIFT);
                self.cycle_focus(&id, forward);
                true
            }
            KeyCode::BackTab => {
                self.cycle_focus(&id, false);
                true
            }
            _ => {
                let keyboard = self
                    .windows
                    .get(&id)
                    .is_some_and(|window| window.config.keyboard);
                if keyboard {
                    self.keydown(&id, key);
                }
                keyboard
            }
        }
    }

    fn handle_mouse(&mut self, event: &Event, mouse: MouseEvent) -> bool {
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.pointer_down(event, column, row),
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(id) = self.active_gesture.clone() else {
                    return false;
                };
                if self.session(&id, true).is_some() {
                    self.drag_to(&id, column, row);
                } else {
                    self.resize_to(&id, column, row);
                }
                true
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(id) = self.active_gesture.clone() else {
                    return false;
                };
                if self.session(&id, true).is_some() {
                    self.end_drag(&id, column, row);
                } else {
                    self.end_resize(&id, column, row);
                }
                true
            }
            _ => false,
        }
    }

    fn pointer_down(&mut self, event: &Event, column: u16, row: u16) -> bool {
        if self.active_gesture.is_some() {
            return true;
        }
        let hit = self
            .stack
            .iter()
            .rev()
            .filter_map(|id| self.windows.get(id))
            .filter(|window| window.node.is_some() && window.status != WindowStatus::Closing)
            .find_map(|window| {
                let layout = chrome_layout(window.rect, &window.content);
                let zone = hit_test(&layout, window.config.resizable, column, row);
                (zone != HitZone::Outside).then(|| (window.id.clone(), zone))
            });

        if let Some((id, zone)) = hit {
            match zone {
                HitZone::Close => self.close(&id, false),
                HitZone::Maximize => self.toggle(&id),
                HitZone::Button(idx) => {
                    let target = self.windows.get(&id).and_then(|window| {
                        let key = window.content.buttons.get(idx)?.key.clone();
                        Some((window.node?, key))
                    });
                    if let Some((node, key)) = target {
                        self.surface.focus(&ElementRef::Control(node, idx));
                        self.action(&id, &key, Some(event.clone()));
                    }
                }
                HitZone::Title => {
                    if self.is_double_click(&id) {
                        self.toggle(&id);
                    } else {
                        self.begin_drag(&id, column, row);
                    }
                }
                HitZone::Resize(edge) => {
                    self.begin_resize(&id, edge, column, row);
                }
                HitZone::Body | HitZone::Outside => {}
            }
            return true;
        }

        if !self.input_lock.is_active() {
            return false;
        }
        if let Some(owner) = self.input_lock.top().cloned()
            && self
                .windows
                .get(&owner)
                .is_some_and(|window| !window.config.modal)
        {
            self.close(&owner, false);
        }
        true
    }

    fn is_double_click(&mut self, id: &WindowId) -> bool {
        let now = Instant::now();
        let show_max = self
            .windows
            .get(id)
            .is_some_and(|window| window.config.show_max);
        let double = show_max
            && matches!(
                &self.last_title_click,
                Some((previous, at)) if previous == id && now.duration_since(*at) <= DOUBLE_CLICK_WINDOW
            );
        self.last_title_click = if double {
            None
        } else {
            Some((id.clone(), now))
        };
        double
    }

    /// Re-lay out every settled window against the current viewport.
    pub fn handle_viewport_resize(&mut self) {
        let viewport = self.surface.viewport();
        for id in self.stack.clone() {
            let Some(instance) = self.windows.get(&id) else {
                continue;
            };
            if instance.node.is_none()
                || !matches!(instance.status, WindowStatus::Open | WindowStatus::Opening)
            {
                continue;
            }
            let target = viewport_target(instance, viewport);
            self.apply_rect(&id, target, Duration::ZERO);
        }
    }

    /// Snap a window whose max/min transition just settled onto the current
    /// viewport, which may have changed while the transition was running.
    fn settle_geometry(&mut self, id: &WindowId) {
        let viewport = self.surface.viewport();
        let Some(instance) = self.windows.get(id) else {
            return;
        };
        let target = viewport_target(instance, viewport);
        if target != instance.rect {
            tracing::debug!(window_id = %id, ?target, "viewport changed during transition");
            self.apply_rect(id, target, Duration::ZERO);
        }
    }

    /// Fire every completion whose deadline has passed. Returns how many ran.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some(pending) = self.animations.pop_due(now) {
            self.run_completion(pending);
            fired += 1;
        }
        fired
    }

    /// Fire every pending completion, including ones scheduled while firing.
    pub fn settle(&mut self) {
        while let Some(pending) = self.animations.pop_next() {
            self.run_completion(pending);
        }
    }

    fn schedule(&mut self, id: &WindowId, speed: Duration, completion: Completion, datum: Option<EventDatum>) {
        let generation = self
            .windows
            .get(id)
            .map(|window| window.generation)
            .unwrap_or_default();
        let now = Instant::now();
        let due = speed
            .checked_add(TRANSITION_GRACE)
            .and_then(|delay| now.checked_add(delay))
            .unwrap_or(now);
        self.animations.schedule(PendingCompletion {
            window: id.clone(),
            generation,
            due,
            completion,
            datum,
        });
    }

    fn complete_or_schedule(
        &mut self,
        id: &WindowId,
        speed: Duration,
        completion: Completion,
        datum: Option<EventDatum>,
    ) {
        if speed.is_zero() {
            self.apply_completion(id, completion, datum);
        } else {
            self.schedule(id, speed, completion, datum);
        }
    }

    fn run_completion(&mut self, pending: PendingCompletion) {
        let current = self.windows.get(&pending.window).map(|window| window.generation);
        if current != Some(pending.generation) {
            tracing::debug!(
                window_id = %pending.window,
                completion = ?pending.completion,
                "discarding stale completion"
            );
            return;
        }
        self.apply_completion(&pending.window, pending.completion, pending.datum);
    }

    fn apply_completion(&mut self, id: &WindowId, completion: Completion, datum: Option<EventDatum>) {
        match completion {
            Completion::Opened => {
                let Some(instance) = self.windows.get_mut(id) else {
                    return;
                };
                instance.status = WindowStatus::Open;
                let focus = instance.config.focus.clone();
                let open_maximized = instance.config.open_maximized;
                self.set_focus(id, focus.as_ref());
                self.finish(datum);
                if open_maximized {
                    self.max(id);
                }
            }
            Completion::Closed => self.teardown(id, datum),
            Completion::Maximized => {
                if let Some(instance) = self.windows.get_mut(id) {
                    instance.maximized = true;
                    instance.status = WindowStatus::Open;
                }
                self.settle_geometry(id);
                self.finish(datum);
            }
            Completion::Restored => {
                if let Some(instance) = self.windows.get_mut(id) {
                    instance.maximized = false;
                    instance.previous_rect = None;
                    instance.status = WindowStatus::Open;
                }
                self.settle_geometry(id);
                self.finish(datum);
            }
            Completion::Resized(on_done) => {
                if let Some(instance) = self.windows.get_mut(id) {
                    instance.status = WindowStatus::Open;
                }
                self.finish(datum);
                if let Some(on_done) = on_done {
                    on_done(self, id);
                }
            }
            Completion::Toggled | Completion::ContentSwapped => self.finish(datum),
            Completion::Unlocked(seq) => self.clear_lock(id, seq),
        }
    }

    fn finish(&mut self, datum: Option<EventDatum>) {
        if let Some(datum) = datum {
            self.events.finish(datum);
        }
    }

    fn apply_rect(&mut self, id: &WindowId, rect: FloatRect, transition: Duration) {
        let Some(instance) = self.windows.get_mut(id) else {
            return;
        };
        instance.rect = rect;
        if let Some(node) = instance.node {
            self.surface.set_rect(node, rect, transition);
        }
        self.sync_messages(id);
    }

    fn sync_messages(&mut self, id: &WindowId) {
        let Some(instance) = self.windows.get(id) else {
            return;
        };
        let Some(node) = instance.node else {
            return;
        };
        let title_height = chrome_layout(instance.rect, &instance.content).title_height();
        let layouts = layout_messages(&instance.messages, instance.rect, title_height);
        self.surface.set_messages(node, &layouts);
    }

    fn acquire_input_lock(&mut self, id: &WindowId) {
        if self.input_lock.acquire(id) {
            self.surface.set_input_lock(true);
        }
    }

    fn release_input_lock(&mut self, id: &WindowId) {
        if self.input_lock.release(id) {
            self.surface.set_input_lock(false);
        }
    }
}

/// Starting rectangle and whether the window should keep auto-centering.
fn initial_rect(config: &WindowConfig, viewport: Rect) -> (FloatRect, bool) {
    match (config.mode, config.position) {
        (GeometryMode::Window, Some((x, y))) => (
            fit_to_screen(viewport, FloatRect::new(x, y, config.width, config.height)),
            false,
        ),
        (GeometryMode::Window, None) => (centered_rect(viewport, config.width, config.height), true),
        (GeometryMode::Popup, _) => (
            layout_rect(
                GeometryMode::Popup,
                viewport,
                FloatRect::new(0, 0, config.width, config.height),
            ),
            true,
        ),
    }
}

/// Where a window belongs in `viewport` given its current layout state.
fn viewport_target(instance: &WindowInstance, viewport: Rect) -> FloatRect {
    let config = &instance.config;
    if instance.maximized {
        maximized_rect(config.mode, viewport)
    } else if instance.auto_center {
        match config.mode {
            GeometryMode::Window => centered_rect(viewport, config.width, config.height),
            GeometryMode::Popup => layout_rect(
                GeometryMode::Popup,
                viewport,
                FloatRect::new(0, 0, config.width, config.height),
            ),
        }
    } else {
        layout_rect(
            config.mode,
            viewport,
            FloatRect::new(instance.rect.x, instance.rect.y, config.width, config.height),
        )
    }
}
