//! Input adapter: terminal key events and emulated buttons to keys and
//! game commands
//!
//! Crossterm already decodes cursor escape sequences, so keys arrive here as
//! typed events. Function keys F1 to F6 stand in for the six hardware
//! buttons.

use crate::command::Command;
use crate::settings;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Number of emulated hardware buttons
pub const BUTTON_COUNT: u8 = 6;

/// A key press as seen by the views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Left,
    Right,
    Up,
    Down,
    /// Hardware button, numbered from 1
    Button(u8),
    /// Ctrl+C
    Interrupt,
}

/// Translate a terminal key event. Releases and unmapped keys yield None.
pub fn key_from_event(event: &KeyEvent) -> Option<Key> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
        return Some(Key::Interrupt);
    }

    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::F(n) if (1..=BUTTON_COUNT).contains(&n) => Key::Button(n),
        _ => return None,
    };
    Some(key)
}

/// Game command bound to a hardware button
pub fn button_command(button: u8) -> Option<Command> {
    match button {
        1 | 5 => Some(Command::HardDrop),
        2 => Some(Command::Rotate),
        3 => Some(Command::MoveLeft),
        4 => Some(Command::MoveRight),
        6 => Some(Command::SoftDrop),
        _ => None,
    }
}

/// Key bindings resolved from settings - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<Key>,
    pub move_right: Vec<Key>,
    pub rotate: Vec<Key>,
    pub soft_drop: Vec<Key>,
    pub hard_drop: Vec<Key>,
    pub quit: Vec<Key>,
}

impl KeyBindings {
    /// Parse a key string
    fn parse_key(s: &str) -> Option<Key> {
        let key = match s.to_lowercase().as_str() {
            "left" => Key::Left,
            "right" => Key::Right,
            "up" => Key::Up,
            "down" => Key::Down,
            "space" => Key::Char(' '),
            "enter" => Key::Enter,
            "esc" | "escape" => Key::Esc,
            "backspace" => Key::Backspace,
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => {
                        tracing::warn!(key = s, "ignoring unknown key name");
                        return None;
                    }
                }
            }
        };
        Some(key)
    }

    /// Parse a list of key strings, dropping unknown names
    fn parse_keys(keys: &[String]) -> Vec<Key> {
        keys.iter().filter_map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(keys: &settings::KeyBindings) -> Self {
        Self {
            move_left: Self::parse_keys(&keys.move_left),
            move_right: Self::parse_keys(&keys.move_right),
            rotate: Self::parse_keys(&keys.rotate),
            soft_drop: Self::parse_keys(&keys.soft_drop),
            hard_drop: Self::parse_keys(&keys.hard_drop),
            quit: Self::parse_keys(&keys.quit),
        }
    }

    /// Game command for a key, if any
    pub fn command(&self, key: Key) -> Option<Command> {
        if let Key::Button(button) = key {
            return button_command(button);
        }

        let key = normalize_key(key);
        if self.move_left.contains(&key) {
            Some(Command::MoveLeft)
        } else if self.move_right.contains(&key) {
            Some(Command::MoveRight)
        } else if self.rotate.contains(&key) {
            Some(Command::Rotate)
        } else if self.soft_drop.contains(&key) {
            Some(Command::SoftDrop)
        } else if self.hard_drop.contains(&key) {
            Some(Command::HardDrop)
        } else {
            None
        }
    }

    pub fn is_quit(&self, key: Key) -> bool {
        self.quit.contains(&normalize_key(key))
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&settings::KeyBindings::default())
    }
}

/// Normalize keys for consistent handling
fn normalize_key(key: Key) -> Key {
    match key {
        Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
