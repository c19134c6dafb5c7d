//! Pin vocabulary shared by every device and controller.
//!
//! Single source of truth for how a line is named, what level it reads,
//! and how it is configured.  Controllers translate these into their own
//! register or library types.

use core::ops::Not;

use embedded_hal::digital::PinState;
use serde::{Deserialize, Serialize};

/// Physical GPIO line number (BCM numbering on Raspberry Pi boards).
pub type PinId = u8;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Raw electrical level of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    pub const fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }
}

impl Not for Level {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

impl From<Level> for PinState {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => PinState::Low,
            Level::High => PinState::High,
        }
    }
}

impl From<PinState> for Level {
    fn from(state: PinState) -> Self {
        match state {
            PinState::Low => Self::Low,
            PinState::High => Self::High,
        }
    }
}

// ---------------------------------------------------------------------------
// Input configuration
// ---------------------------------------------------------------------------

/// Internal bias resistor applied to an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pull {
    Up,
    Down,
    Off,
}

/// Transition that triggers a wait or an edge handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Rising,
    Falling,
    Both,
}

impl Edge {
    /// Whether a change from `from` to `to` matches this edge.
    pub const fn matches(self, from: Level, to: Level) -> bool {
        match (self, from, to) {
            (Self::Rising | Self::Both, Level::Low, Level::High)
            | (Self::Falling | Self::Both, Level::High, Level::Low) => true,
            _ => false,
        }
    }
}

/// Direction of a line together with its pull (input) or initial level
/// (output).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input(Pull),
    Output(Level),
}
