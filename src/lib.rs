//! pinsense: sensor devices over a GPIO pin controller.
//!
//! Devices take an injected [`PinController`] (or [`ThermalProbe`]) rather
//! than a process-wide hardware binding, so every device runs against the
//! mocks in `tests/integration/` on the host as well as against
//! [`adapters::rpi`] on a board (feature `rpi`).
//!
//! ```text
//!  DigitalInputDevice ──┐
//!  MotionSensor ────────┼──▶ PinController ──▶ GPIO lines
//!  LightSensor ─────────┘
//!  TemperatureSensor ──────▶ ThermalProbe  ──▶ one-wire bus
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod config;
pub mod drivers;
pub mod pins;
pub mod ports;
pub mod sensors;

mod error;

pub use config::{InputConfig, LightSensorConfig, MotionSensorConfig};
pub use error::{ConfigError, Error, Result};
pub use pins::{Edge, Level, PinId, PinMode, Pull};
pub use ports::{Clock, EdgeHandler, PinController, ThermalProbe};
pub use sensors::input::DigitalInputDevice;
pub use sensors::light::LightSensor;
pub use sensors::motion::MotionSensor;
pub use sensors::temperature::TemperatureSensor;
