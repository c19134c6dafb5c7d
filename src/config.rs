//! Device construction parameters
//!
//! One struct per device, each deserializable with missing fields falling
//! back to the defaults below.  Validation happens when a device is built,
//! so a config loaded without a `pin` is only rejected at construction.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pins::{Edge, Level, PinId, Pull};
use crate::ports::PinController;

/// Debounce applied by `add_callback_default` on
/// [`DigitalInputDevice`](crate::sensors::input::DigitalInputDevice).
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Upper bound on the motion sensor's rolling window.
pub const MAX_QUEUE_LEN: usize = 256;

/// Digital input line configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// GPIO line; required
    pub pin: Option<PinId>,
    /// Bias resistor
    pub pull: Pull,
    /// Edge used by waits and callbacks
    pub edge: Edge,
    /// Raw level read as "active"; the inactive level is its negation
    pub active_state: Level,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pin: None,
            pull: Pull::Up,
            edge: Edge::Falling,
            active_state: Level::Low,
        }
    }
}

impl InputConfig {
    pub fn new(pin: PinId) -> Self {
        Self {
            pin: Some(pin),
            ..Self::default()
        }
    }

    /// Momentary switch to ground: pulled high, active low, fires on press.
    pub fn button(pin: PinId) -> Self {
        Self::new(pin)
    }
}

/// Passive-infrared motion sensor configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSensorConfig {
    #[serde(flatten)]
    pub input: InputConfig,
    /// Samples kept for the majority vote
    pub queue_len: usize,
    /// Samples per second
    pub sample_rate_hz: f64,
    /// Answer queries before the window has filled
    pub partial: bool,
}

impl Default for MotionSensorConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            queue_len: 20,
            sample_rate_hz: 10.0, // 100 ms
            partial: false,
        }
    }
}

impl MotionSensorConfig {
    pub fn new(pin: PinId) -> Self {
        Self {
            input: InputConfig::new(pin),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_len == 0 {
            return Err(ConfigError::ValidationFailed("queue_len must be at least 1"));
        }
        if self.queue_len > MAX_QUEUE_LEN {
            return Err(ConfigError::ValidationFailed("queue_len exceeds MAX_QUEUE_LEN"));
        }
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "sample_rate_hz must be positive and finite",
            ));
        }
        self.sample_interval().map(|_| ())
    }

    /// Time between two samples.  Fails when the rate is so low that the
    /// interval does not fit in a `Duration`.
    pub fn sample_interval(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(1.0 / self.sample_rate_hz)
            .map_err(|_| ConfigError::ValidationFailed("sample_rate_hz is too low"))
    }
}

/// RC-charge light sensor configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSensorConfig {
    /// GPIO line wired to the capacitor; required
    pub pin: Option<PinId>,
    /// Charge-time ceiling in seconds, also the score denominator
    pub darkness_level_secs: f64,
}

impl Default for LightSensorConfig {
    fn default() -> Self {
        Self {
            pin: None,
            darkness_level_secs: 0.01,
        }
    }
}

impl LightSensorConfig {
    pub fn new(pin: PinId) -> Self {
        Self {
            pin: Some(pin),
            ..Self::default()
        }
    }
}

pub(crate) fn validate_darkness_level(secs: f64) -> Result<Duration, ConfigError> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(ConfigError::ValidationFailed(
            "darkness_level_secs must be positive and finite",
        ));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| ConfigError::ValidationFailed("darkness_level_secs is too large"))
}

/// Resolve an optional pin against the lines `controller` can drive.
pub(crate) fn require_pin<C: PinController>(
    pin: Option<PinId>,
    controller: &C,
) -> Result<PinId, ConfigError> {
    let pin = pin.ok_or(ConfigError::MissingPin)?;
    if controller.has_pin(pin) {
        Ok(pin)
    } else {
        Err(ConfigError::InvalidPin(pin))
    }
}
