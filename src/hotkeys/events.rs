use serde::{Deserialize, Serialize};

use crate::core::{Direction, FilterParam};

pub mod keys {
    pub const ENTER: u32 = 13;
    pub const SHIFT: u32 = 16;
    pub const CTRL: u32 = 17;
    pub const ALT: u32 = 18;
    pub const ESCAPE: u32 = 27;
    pub const SPACE: u32 = 32;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    pub const DIGIT_1: u32 = 49;
    pub const DIGIT_4: u32 = 52;
    pub const C: u32 = 67;
    pub const D: u32 = 68;
    pub const E: u32 = 69;
    pub const F: u32 = 70;
    pub const I: u32 = 73;
    pub const J: u32 = 74;
    pub const K: u32 = 75;
    pub const O: u32 = 79;
    pub const Q: u32 = 81;
    pub const R: u32 = 82;
    pub const S: u32 = 83;
    pub const T: u32 = 84;
    pub const U: u32 = 85;
    pub const W: u32 = 87;
    pub const X: u32 = 88;
    pub const Y: u32 = 89;
    pub const Z: u32 = 90;
    pub const NUMPAD_1: u32 = 97;
    pub const NUMPAD_4: u32 = 100;
    pub const BACKSLASH: u32 = 220;

    /// Key codes the engine looks at. Anything else passes straight through.
    pub const WATCHED: [u32; 36] = [
        ENTER, SHIFT, CTRL, ALT, ESCAPE, SPACE, LEFT, UP, RIGHT, DOWN, 49, 50, 51, DIGIT_4, C, D, E,
        F, I, J, K, O, Q, R, S, T, U, W, X, Y, Z, NUMPAD_1, 98, 99, NUMPAD_4, BACKSLASH,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventTarget {
    pub node_name: String,
    pub content_editable: bool,
}

impl EventTarget {
    pub fn element(node_name: &str) -> Self {
        Self {
            node_name: node_name.to_string(),
            content_editable: false,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.content_editable
            || matches!(
                self.node_name.to_ascii_uppercase().as_str(),
                "INPUT" | "TEXTAREA" | "SELECT"
            )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyEvent {
    pub key_code: u32,
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub target: EventTarget,
}

impl KeyEvent {
    pub fn new(key_code: u32) -> Self {
        Self {
            key_code,
            target: EventTarget::element("BODY"),
            ..Default::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn targeting(mut self, target: EventTarget) -> Self {
        self.target = target;
        self
    }

    pub fn is_watched(&self) -> bool {
        keys::WATCHED.contains(&self.key_code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeToggle {
    /// Ctrl+Space
    Enabled,
    /// Ctrl+Backslash
    GlobalMode,
}

impl ModeToggle {
    pub fn resolve(event: &KeyEvent) -> Option<Self> {
        if !event.ctrl {
            return None;
        }
        match event.key_code {
            keys::SPACE => Some(ModeToggle::Enabled),
            keys::BACKSLASH => Some(ModeToggle::GlobalMode),
            _ => None,
        }
    }
}

/// Coarse command categories, used by the per-site policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Scale,
    SeekForward,
    SeekBackward,
    Volume,
    TogglePlay,
    PlaybackRate,
    FrameForward,
    FrameBackward,
    Filter,
    ResetFilters,
    Rotate,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    ScaleDown,
    ScaleUp,
    ScaleReset,
    SeekForward,
    SeekBackward,
    VolumeUp,
    VolumeDown,
    TogglePlay,
    RateDown,
    RateUp,
    RateReset,
    RateSet(u8),
    FrameForward,
    FrameBackward,
    Filter(FilterParam, Direction),
    ResetFilters,
    Rotate,
    Fullscreen,
}

impl Command {
    /// The key table. Alt or Ctrl suppress everything; Shift only reaches scaling.
    pub fn resolve(event: &KeyEvent) -> Option<Self> {
        if event.alt || event.ctrl {
            return None;
        }

        if event.shift {
            return match event.key_code {
                keys::X => Some(Command::ScaleDown),
                keys::C => Some(Command::ScaleUp),
                keys::Z => Some(Command::ScaleReset),
                _ => None,
            };
        }

        use Direction::{Down, Up};
        use FilterParam::*;
        let command = match event.key_code {
            keys::RIGHT => Command::SeekForward,
            keys::LEFT => Command::SeekBackward,
            keys::UP => Command::VolumeUp,
            keys::DOWN => Command::VolumeDown,
            keys::SPACE => Command::TogglePlay,
            keys::X => Command::RateDown,
            keys::C => Command::RateUp,
            keys::Z => Command::RateReset,
            code @ keys::DIGIT_1..=keys::DIGIT_4 => Command::RateSet((code - keys::DIGIT_1 + 1) as u8),
            code @ keys::NUMPAD_1..=keys::NUMPAD_4 => Command::RateSet((code - keys::NUMPAD_1 + 1) as u8),
            keys::F => Command::FrameForward,
            keys::D => Command::FrameBackward,
            keys::E => Command::Filter(Brightness, Up),
            keys::W => Command::Filter(Brightness, Down),
            keys::T => Command::Filter(Contrast, Up),
            keys::R => Command::Filter(Contrast, Down),
            keys::U => Command::Filter(Saturation, Up),
            keys::Y => Command::Filter(Saturation, Down),
            keys::O => Command::Filter(HueRotate, Up),
            keys::I => Command::Filter(HueRotate, Down),
            keys::K => Command::Filter(Blur, Up),
            keys::J => Command::Filter(Blur, Down),
            keys::Q => Command::ResetFilters,
            keys::S => Command::Rotate,
            keys::ENTER => Command::Fullscreen,
            _ => return None,
        };
        Some(command)
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::ScaleDown | Command::ScaleUp | Command::ScaleReset => CommandKind::Scale,
            Command::SeekForward => CommandKind::SeekForward,
            Command::SeekBackward => CommandKind::SeekBackward,
            Command::VolumeUp | Command::VolumeDown => CommandKind::Volume,
            Command::TogglePlay => CommandKind::TogglePlay,
            Command::RateDown | Command::RateUp | Command::RateReset | Command::RateSet(_) => {
                CommandKind::PlaybackRate
            }
            Command::FrameForward => CommandKind::FrameForward,
            Command::FrameBackward => CommandKind::FrameBackward,
            Command::Filter(..) => CommandKind::Filter,
            Command::ResetFilters => CommandKind::ResetFilters,
            Command::Rotate => CommandKind::Rotate,
            Command::Fullscreen => CommandKind::Fullscreen,
        }
    }
}
