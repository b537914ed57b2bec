//! Pointer and keyboard channel
//!
//! Every discrete click or key press maps to at most one intent, no debouncing.

use super::IntentSource;
use crate::consts::MAX_OPTIONS;
use crate::sim::resolver::{Channel, SelectionIntent};

/// Keys the game cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Top-row or numpad digit 0-9 (numpad 0 excluded, it is a switch key)
    Digit(u8),
    /// Any other single printable character, lowercased
    Char(char),
    Space,
    Enter,
    Numpad0,
    ArrowUp,
    ArrowDown,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }

    /// Build from a DOM `KeyboardEvent` (`key`, `code`, `ctrlKey`)
    pub fn from_dom(key: &str, code: &str, ctrl: bool) -> Self {
        let key = match (key, code) {
            (_, "Numpad0") => Key::Numpad0,
            (" ", _) | (_, "Space") => Key::Space,
            ("Enter", _) => Key::Enter,
            ("ArrowUp", _) => Key::ArrowUp,
            ("ArrowDown", _) => Key::ArrowDown,
            ("Escape", _) | ("Esc", _) => Key::Escape,
            (k, _) => single_char(k),
        };
        Self { key, ctrl }
    }

    /// Parse a chord like `3`, `r`, `space`, `ctrl+n`, `ctrl+up`
    pub fn parse_chord(chord: &str) -> Option<Self> {
        let chord = chord.trim().to_lowercase();
        let (ctrl, name) = match chord.strip_prefix("ctrl+") {
            Some(rest) => (true, rest.to_string()),
            None => (false, chord),
        };
        let key = match name.as_str() {
            "" => return None,
            "space" => Key::Space,
            "enter" | "return" => Key::Enter,
            "numpad0" | "kp0" => Key::Numpad0,
            "up" | "arrowup" => Key::ArrowUp,
            "down" | "arrowdown" => Key::ArrowDown,
            "esc" | "escape" => Key::Escape,
            other => match single_char(other) {
                Key::Other => return None,
                key => key,
            },
        };
        Some(Self { key, ctrl })
    }
}

fn single_char(k: &str) -> Key {
    let mut chars = k.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_digit() => Key::Digit(c as u8 - b'0'),
        (Some(c), None) if !c.is_control() => Key::Char(c.to_ascii_lowercase()),
        _ => Key::Other,
    }
}

/// One click or key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerInput {
    /// Click/tap on option `index`
    Pointer(usize),
    Key(KeyPress),
}

/// Pointer clicks and keyboard shortcuts
#[derive(Debug, Clone, Default)]
pub struct PointerKeyboard {
    /// Switch input enabled: digit keys highlight instead of selecting
    switch_mode: bool,
}

impl PointerKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_switch_mode(&mut self, on: bool) {
        self.switch_mode = on;
    }

    /// Direct click/tap on option `index` always selects
    pub fn pointer(&self, index: usize) -> SelectionIntent {
        SelectionIntent::Select(index)
    }

    pub fn key(&self, press: &KeyPress) -> Option<SelectionIntent> {
        match press.key {
            Key::Digit(d) if (1..=MAX_OPTIONS as u8).contains(&d) => {
                let index = usize::from(d - 1);
                Some(if self.switch_mode {
                    SelectionIntent::Highlight(index)
                } else {
                    SelectionIntent::Select(index)
                })
            }
            Key::Char('r') => Some(SelectionIntent::Repeat),
            Key::Char('h') => Some(SelectionIntent::Help),
            Key::Char('n') if press.ctrl => Some(SelectionIntent::NextRound),
            _ => None,
        }
    }
}

impl IntentSource for PointerKeyboard {
    type Input = PointerInput;

    fn channel(&self) -> Channel {
        Channel::PointerKeyboard
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn on_input(&mut self, input: &PointerInput) -> Option<SelectionIntent> {
        match input {
            PointerInput::Pointer(index) => Some(self.pointer(*index)),
            PointerInput::Key(press) => self.key(press),
        }
    }
}
