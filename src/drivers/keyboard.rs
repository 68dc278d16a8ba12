//! Raw key event cleanup before events reach the window manager.
//!
//! Terminals disagree on how they report Shift+Tab and whether they emit
//! release events. Windows consoles also auto-repeat Escape, which would
//! close a stack of popups in one key press.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Default)]
pub struct KeyboardNormalizer {
    esc_down: bool,
}

impl KeyboardNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` for events the window manager should never see.
    pub fn normalize(&mut self, event: Event) -> Option<Event> {
        match event {
            Event::Key(key) => self.normalize_key(key).map(Event::Key),
            other => Some(other),
        }
    }

    fn normalize_key(&mut self, mut key: KeyEvent) -> Option<KeyEvent> {
        if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
            key.code = KeyCode::BackTab;
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
        match key.kind {
            KeyEventKind::Release => {
                if key.code == KeyCode::Esc {
                    self.esc_down = false;
                }
                return None;
            }
            KeyEventKind::Repeat if cfg!(windows) => return None,
            _ => {}
        }
        if key.code != KeyCode::Esc {
            self.esc_down = false;
            return Some(key);
        }
        // only the first Escape of a held key gets through until it is released
        if cfg!(windows) && self.esc_down {
            return None;
        }
        self.esc_down = cfg!(windows);
        Some(key)
    }
}
