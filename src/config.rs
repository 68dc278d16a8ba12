//! Window configuration.
//!
//! `WindowOptions` is what callers hand to `open`: every field is optional,
//! and option documents deserialized from JSON ignore keys they do not
//! recognize. `WindowConfig` is the resolved form an instance keeps for its
//! lifetime. It is rebuilt on every (re)open as
//! `defaults ⊕ previous config ⊕ new options`.
//!
//! There is deliberately no `maximized` option. Whether a window is
//! maximized is reported by the instance; starting maximized is requested
//! with `open_maximized`.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use crossterm::event::Event;
use ratatui::style::{Color, Style};
use serde::Deserialize;

use crate::constants::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_TRANSITION};
use crate::error::PopupError;
use crate::layout::GeometryMode;
use crate::window::{WindowId, WindowManager};

/// Context handed to an action callback.
#[derive(Debug, Clone)]
pub struct ActionEvent {
    pub window: WindowId,
    pub action: String,
    pub source: Option<Event>,
}

/// Callback bound to a window action. It receives the manager so it can
/// drive further transitions (closing the window, opening another, ...).
pub type ActionCallback = Rc<dyn Fn(&mut WindowManager, &ActionEvent)>;

/// How a configured action is declared.
#[derive(Clone)]
pub enum ActionHandler {
    /// A plain callback; the button label is the action name.
    Direct(ActionCallback),
    /// A labelled, styled button with an optional click callback.
    Described {
        label: Option<String>,
        style: Option<String>,
        on_click: Option<ActionCallback>,
    },
    /// A button that dispatches the named action.
    Alias(String),
}

impl ActionHandler {
    pub fn direct<F>(callback: F) -> Self
    where
        F: Fn(&mut WindowManager, &ActionEvent) + 'static,
    {
        Self::Direct(Rc::new(callback))
    }

    pub fn described<F>(label: impl Into<String>, style: Option<&str>, callback: F) -> Self
    where
        F: Fn(&mut WindowManager, &ActionEvent) + 'static,
    {
        Self::Described {
            label: Some(label.into()),
            style: style.map(str::to_string),
            on_click: Some(Rc::new(callback)),
        }
    }

    pub fn alias(name: impl Into<String>) -> Self {
        Self::Alias(name.into())
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionHandler::Direct(_) => f.write_str("Direct(..)"),
            ActionHandler::Described { label, style, on_click } => f
                .debug_struct("Described")
                .field("label", label)
                .field("style", style)
                .field("on_click", &on_click.is_some())
                .finish(),
            ActionHandler::Alias(name) => f.debug_tuple("Alias").field(name).finish(),
        }
    }
}

/// Normalize an action name into its lookup key: first character lower-cased
/// and all whitespace removed ("Save As" -> "saveAs").
pub fn normalize_action_key(name: &str) -> String {
    let mut chars = name.chars().filter(|c| !c.is_whitespace());
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Clone)]
pub struct ResolvedAction {
    pub key: String,
    pub name: String,
    pub label: String,
    pub style: Option<String>,
    pub callback: Option<ActionCallback>,
}

impl fmt::Debug for ResolvedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAction")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("style", &self.style)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Uniform handler table built once per configuration merge.
#[derive(Debug, Clone, Default)]
pub struct ActionTable {
    entries: Vec<ResolvedAction>,
}

impl ActionTable {
    pub fn resolve(actions: &[(String, ActionHandler)]) -> Self {
        let mut entries: Vec<ResolvedAction> = actions
            .iter()
            .map(|(name, handler)| match handler {
                ActionHandler::Direct(callback) => ResolvedAction {
                    key: normalize_action_key(name),
                    name: name.clone(),
                    label: name.clone(),
                    style: None,
                    callback: Some(Rc::clone(callback)),
                },
                ActionHandler::Described {
                    label,
                    style,
                    on_click,
                } => ResolvedAction {
                    key: normalize_action_key(name),
                    name: name.clone(),
                    label: label.clone().unwrap_or_else(|| name.clone()),
                    style: style.clone(),
                    callback: on_click.clone(),
                },
                ActionHandler::Alias(target) => ResolvedAction {
                    key: normalize_action_key(target),
                    name: target.clone(),
                    label: target.clone(),
                    style: None,
                    callback: None,
                },
            })
            .collect();
        // aliases borrow the callback of the action they name
        for idx in 0..entries.len() {
            if entries[idx].callback.is_some() {
                continue;
            }
            let key = entries[idx].key.clone();
            let target = entries
                .iter()
                .enumerate()
                .find(|(other, entry)| *other != idx && entry.key == key && entry.callback.is_some())
                .and_then(|(_, entry)| entry.callback.clone());
            entries[idx].callback = target;
        }
        Self { entries }
    }

    /// Look an action up by its normalized key or its declared name.
    pub fn get(&self, name: &str) -> Option<&ResolvedAction> {
        let key = normalize_action_key(name);
        self.entries
            .iter()
            .find(|entry| entry.key == key || entry.name == name)
    }

    pub fn entries(&self) -> &[ResolvedAction] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Element that receives focus when a window opens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FocusTarget {
    Index(usize),
    Selector(String),
}

/// Colour overrides for the window body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    pub fg: Option<String>,
    pub bg: Option<String>,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none()
    }

    pub fn to_style(&self) -> Style {
        let mut style = Style::default();
        if let Some(fg) = self.fg.as_deref().and_then(parse_color) {
            style = style.fg(fg);
        }
        if let Some(bg) = self.bg.as_deref().and_then(parse_color) {
            style = style.bg(bg);
        }
        style
    }
}

fn parse_color(name: &str) -> Option<Color> {
    match Color::from_str(name) {
        Ok(color) => Some(color),
        Err(_) => {
            tracing::warn!(color = name, "ignoring unknown colour");
            None
        }
    }
}

/// Caller-facing, partial window options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    pub name: Option<String>,
    pub title: Option<String>,
    /// Plain message shown centered in the body. Replaces `body` when set.
    pub text: Option<String>,
    pub body: Option<String>,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub modal: Option<bool>,
    pub keyboard: Option<bool>,
    pub show_close: Option<bool>,
    pub show_max: Option<bool>,
    pub open_maximized: Option<bool>,
    pub resizable: Option<bool>,
    pub focus: Option<FocusTarget>,
    pub cancel_action: Option<String>,
    pub style: Option<StyleOverrides>,
    /// Transition duration in seconds.
    pub speed: Option<f64>,
    pub mode: Option<GeometryMode>,
    pub keep_centered: Option<bool>,
    #[serde(skip)]
    pub actions: Option<Vec<(String, ActionHandler)>>,
}

impl WindowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(document: &str) -> Result<Self, PopupError> {
        Ok(serde_json::from_str(document)?)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = Some(modal);
        self
    }

    pub fn keyboard(mut self, keyboard: bool) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn show_close(mut self, show: bool) -> Self {
        self.show_close = Some(show);
        self
    }

    pub fn show_max(mut self, show: bool) -> Self {
        self.show_max = Some(show);
        self
    }

    pub fn open_maximized(mut self, maximized: bool) -> Self {
        self.open_maximized = Some(maximized);
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = Some(resizable);
        self
    }

    pub fn focus(mut self, target: FocusTarget) -> Self {
        self.focus = Some(target);
        self
    }

    pub fn cancel_action(mut self, action: impl Into<String>) -> Self {
        self.cancel_action = Some(action.into());
        self
    }

    pub fn style(mut self, style: StyleOverrides) -> Self {
        self.style = Some(style);
        self
    }

    pub fn speed(mut self, speed: Duration) -> Self {
        self.speed = Some(speed.as_secs_f64());
        self
    }

    pub fn mode(mut self, mode: GeometryMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn keep_centered(mut self, keep: bool) -> Self {
        self.keep_centered = Some(keep);
        self
    }

    pub fn action(mut self, name: impl Into<String>, handler: ActionHandler) -> Self {
        self.actions
            .get_or_insert_with(Vec::new)
            .push((name.into(), handler));
        self
    }
}

/// Fully resolved configuration of one window.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub body: String,
    pub body_centered: bool,
    pub width: u16,
    pub height: u16,
    pub position: Option<(i32, i32)>,
    pub modal: bool,
    pub keyboard: bool,
    pub show_close: bool,
    pub show_max: bool,
    pub open_maximized: bool,
    pub resizable: bool,
    pub focus: Option<FocusTarget>,
    pub cancel_action: Option<String>,
    pub style: StyleOverrides,
    pub speed: Duration,
    pub mode: GeometryMode,
    pub keep_centered: bool,
    pub actions: ActionTable,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            body_centered: false,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            position: None,
            modal: false,
            keyboard: true,
            show_close: true,
            show_max: false,
            open_maximized: false,
            resizable: false,
            focus: None,
            cancel_action: None,
            style: StyleOverrides::default(),
            speed: Duration::ZERO,
            mode: GeometryMode::Window,
            keep_centered: false,
            actions: ActionTable::default(),
        }
    }
}

/// Seconds to a transition length. Negative or NaN means instant, anything
/// past `MAX_TRANSITION` is capped.
fn transition_speed(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds)
        .unwrap_or(MAX_TRANSITION)
        .min(MAX_TRANSITION)
}

impl WindowConfig {
    /// Layer `options` over `self`. Explicit options always win.
    pub fn merged(&self, options: WindowOptions) -> Self {
        let mut config = self.clone();
        if let Some(title) = options.title {
            config.title = title;
        }
        if let Some(text) = options.text {
            config.body = text;
            config.body_centered = true;
        } else if let Some(body) = options.body {
            config.body = body;
            config.body_centered = false;
        }
        if let Some(width) = options.width {
            config.width = width;
        }
        if let Some(height) = options.height {
            config.height = height;
        }
        // a lone axis is ignored; the previous position survives a reopen
        if let (Some(x), Some(y)) = (options.x, options.y) {
            config.position = Some((x, y));
        }
        if let Some(modal) = options.modal {
            config.modal = modal;
        }
        if let Some(keyboard) = options.keyboard {
            config.keyboard = keyboard;
        }
        if let Some(show) = options.show_close {
            config.show_close = show;
        }
        if let Some(show) = options.show_max {
            config.show_max = show;
        }
        if let Some(open_maximized) = options.open_maximized {
            config.open_maximized = open_maximized;
        }
        if let Some(resizable) = options.resizable {
            config.resizable = resizable;
        }
        if options.focus.is_some() {
            config.focus = options.focus;
        }
        if options.cancel_action.is_some() {
            config.cancel_action = options.cancel_action;
        }
        if let Some(style) = options.style {
            config.style = style;
        }
        if let Some(speed) = options.speed {
            config.speed = transition_speed(speed);
        }
        if let Some(mode) = options.mode {
            config.mode = mode;
        }
        if let Some(keep) = options.keep_centered {
            config.keep_centered = keep;
        }
        if let Some(actions) = options.actions {
            config.actions = ActionTable::resolve(&actions);
        }
        config
    }

    pub fn has_buttons(&self) -> bool {
        !self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_lowercases_first_and_strips_spaces() {
        assert_eq!(normalize_action_key("Save As"), "saveAs");
        assert_eq!(normalize_action_key("ok"), "ok");
        assert_eq!(normalize_action_key(""), "");
    }

    #[test]
    fn merge_prefers_new_options() {
        let base = WindowConfig::default().merged(WindowOptions::new().title("a").size(40, 10));
        let merged = base.merged(WindowOptions::new().title("b"));
        assert_eq!(merged.title, "b");
        assert_eq!((merged.width, merged.height), (40, 10));
    }

    #[test]
    fn text_replaces_body_and_centers() {
        let config = WindowConfig::default().merged(WindowOptions::new().body("x").text("hi"));
        assert_eq!(config.body, "hi");
        assert!(config.body_centered);
    }

    #[test]
    fn position_requires_both_axes() {
        let mut options = WindowOptions::new();
        options.x = Some(3);
        let config = WindowConfig::default().merged(options);
        assert_eq!(config.position, None);
        let config = WindowConfig::default().merged(WindowOptions::new().position(3, 4));
        assert_eq!(config.position, Some((3, 4)));
    }

    #[test]
    fn json_options_ignore_unknown_keys() {
        let options = WindowOptions::from_json(
            r#"{ "title": "Hello", "width": 30, "maximized": true, "bogus": [1, 2], "focus": 1 }"#,
        )
        .expect("valid options");
        assert_eq!(options.title.as_deref(), Some("Hello"));
        assert_eq!(options.width, Some(30));
        assert_eq!(options.focus, Some(FocusTarget::Index(1)));
    }

    #[test]
    fn json_mode_and_selector_focus() {
        let options =
            WindowOptions::from_json(r#"{ "mode": "popup", "focus": "name" }"#).expect("valid");
        assert_eq!(options.mode, Some(GeometryMode::Popup));
        assert_eq!(options.focus, Some(FocusTarget::Selector("name".into())));
    }

    #[test]
    fn negative_speed_collapses_to_zero() {
        let mut options = WindowOptions::new();
        options.speed = Some(-1.0);
        let config = WindowConfig::default().merged(options);
        assert_eq!(config.speed, Duration::ZERO);
    }

    #[test]
    fn huge_speed_is_capped() {
        let options = WindowOptions::from_json(r#"{ "speed": 1e19 }"#).expect("valid");
        let config = WindowConfig::default().merged(options);
        assert_eq!(config.speed, MAX_TRANSITION);

        let config = WindowConfig::default().merged(WindowOptions::new().speed(Duration::MAX));
        assert_eq!(config.speed, MAX_TRANSITION);
    }

    #[test]
    fn previous_position_survives_merge() {
        let config = WindowConfig::default().merged(WindowOptions::new().position(3, 4));
        let mut options = WindowOptions::new();
        options.x = Some(9);
        let config = config.merged(options);
        assert_eq!(config.position, Some((3, 4)));

        let config = config.merged(WindowOptions::new().title("again"));
        assert_eq!(config.position, Some((3, 4)));
    }

    #[test]
    fn alias_borrows_named_callback() {
        let table = ActionTable::resolve(&[
            ("Ok".to_string(), ActionHandler::direct(|_, _| {})),
            ("again".to_string(), ActionHandler::alias("ok")),
            ("Cancel".to_string(), ActionHandler::alias("Cancel")),
        ]);
        assert_eq!(table.len(), 3);
        assert!(table.entries()[1].callback.is_some());
        assert!(table.get("cancel").is_some_and(|entry| entry.callback.is_none()));
        assert_eq!(table.get("Ok").map(|entry| entry.label.as_str()), Some("Ok"));
    }

    #[test]
    fn described_uses_label() {
        let table = ActionTable::resolve(&[(
            "save".to_string(),
            ActionHandler::described("Save file", Some("bold"), |_, _| {}),
        )]);
        let entry = table.get("save").expect("entry");
        assert_eq!(entry.label, "Save file");
        assert_eq!(entry.style.as_deref(), Some("bold"));
    }

    #[test]
    fn style_overrides_parse_known_colours() {
        let style = StyleOverrides {
            fg: Some("red".into()),
            bg: Some("not-a-colour".into()),
        }
        .to_style();
        assert_eq!(style.fg, Some(Color::Red));
        assert_eq!(style.bg, None);
    }
}
