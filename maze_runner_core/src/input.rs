use serde::{Deserialize, Serialize};

use crate::Direction;

/// Decoded directional key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    pub const ALL: [Key; 4] = [Key::ArrowUp, Key::ArrowDown, Key::ArrowLeft, Key::ArrowRight];

    /// Decodes a DOM-style key name. Anything other than the four arrows is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            _ => None,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Key::ArrowUp => Direction::Up,
            Key::ArrowDown => Direction::Down,
            Key::ArrowLeft => Direction::Left,
            Key::ArrowRight => Direction::Right,
        }
    }

    fn index(self) -> usize {
        match self {
            Key::ArrowUp => 0,
            Key::ArrowDown => 1,
            Key::ArrowLeft => 2,
            Key::ArrowRight => 3,
        }
    }
}

/// Receiver of discrete key transitions.
///
/// The transport (terminal, window, replay file) decodes its own events and
/// forwards them here.
pub trait InputListener {
    fn on_key_down(&mut self, key: Key);
    fn on_key_up(&mut self, key: Key);
}

/// Which arrow keys are currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pressed: [bool; 4],
}

impl KeyState {
    pub fn press(&mut self, key: Key) {
        self.pressed[key.index()] = true;
    }

    pub fn release(&mut self, key: Key) {
        self.pressed[key.index()] = false;
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed[key.index()]
    }
}
