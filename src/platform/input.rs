//! Keyboard to logical input mapping
//!
//! Keys are DOM `KeyboardEvent.key` strings. Unknown keys are ignored.

use crate::sim::TickInput;

/// Logical action bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Left,
    Right,
    Up,
    Down,
    Restart,
    ToggleView,
}

impl KeyAction {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(KeyAction::Left),
            "ArrowRight" | "d" | "D" => Some(KeyAction::Right),
            "ArrowUp" | "w" | "W" | " " => Some(KeyAction::Up),
            "ArrowDown" | "s" | "S" => Some(KeyAction::Down),
            "r" | "R" | "Enter" => Some(KeyAction::Restart),
            "v" | "V" | "c" | "C" => Some(KeyAction::ToggleView),
            _ => None,
        }
    }
}

/// Tracks held directions plus pending edge-triggered commands between frames
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    input: TickInput,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the key is bound
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(action) = KeyAction::from_key(key) else {
            return false;
        };
        match action {
            KeyAction::Left => self.input.left = true,
            KeyAction::Right => self.input.right = true,
            KeyAction::Up => self.input.up = true,
            KeyAction::Down => self.input.down = true,
            KeyAction::Restart => self.input.restart = true,
            KeyAction::ToggleView => self.input.toggle_view = true,
        }
        true
    }

    /// Returns whether the key is bound
    pub fn key_up(&mut self, key: &str) -> bool {
        let Some(action) = KeyAction::from_key(key) else {
            return false;
        };
        match action {
            KeyAction::Left => self.input.left = false,
            KeyAction::Right => self.input.right = false,
            KeyAction::Up => self.input.up = false,
            KeyAction::Down => self.input.down = false,
            // Edge commands stay pending until a frame consumes them
            KeyAction::Restart | KeyAction::ToggleView => {}
        }
        true
    }

    /// Input for the next tick
    pub fn current(&self) -> TickInput {
        self.input
    }

    /// Clear one-shot commands after a simulated frame
    pub fn consume_edges(&mut self) {
        self.input.restart = false;
        self.input.toggle_view = false;
    }

    /// Forget everything (focus lost)
    pub fn release_all(&mut self) {
        self.input = TickInput::default();
    }
}
