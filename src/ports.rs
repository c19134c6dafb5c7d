//! Port traits: the boundary between device logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Device (sensors::*)
//! ```
//!
//! Controllers, thermal probes and clocks implement these traits.  Devices
//! consume them via generics, so no device touches a hardware library
//! directly and every device can be driven by a test double.

use core::time::Duration;

use crate::pins::{Edge, Level, PinId, PinMode};

// ───────────────────────────────────────────────────────────────
// Pin controller (driven adapter: device ↔ GPIO lines)
// ───────────────────────────────────────────────────────────────

/// Low-level GPIO access shared by every device built on a board.
///
/// Implementations are expected to be safe for concurrent access to
/// *different* pins and for reads of a single pin from several threads.
/// Concurrent reconfiguration of the same pin is not supported.
pub trait PinController: Send + Sync + 'static {
    /// Error surfaced unchanged through [`Error::Pin`](crate::Error::Pin).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether `pin` names a line this controller can drive.
    fn has_pin(&self, pin: PinId) -> bool;

    /// Configure direction together with pull (input) or initial level (output).
    fn setup(&self, pin: PinId, mode: PinMode) -> Result<(), Self::Error>;

    /// Read the raw level.
    fn input(&self, pin: PinId) -> Result<Level, Self::Error>;

    /// Drive the level of a pin configured as output.
    fn output(&self, pin: PinId, level: Level) -> Result<(), Self::Error>;

    /// Block the calling thread until `edge` occurs on `pin`.
    fn wait_for_edge(&self, pin: PinId, edge: Edge) -> Result<(), Self::Error>;

    /// Register `handler` for `edge`, ignoring retriggers within `debounce`.
    ///
    /// The handler runs on a thread of the controller's choosing.
    fn add_event_detect(
        &self,
        pin: PinId,
        edge: Edge,
        handler: Box<dyn EdgeHandler>,
        debounce: Duration,
    ) -> Result<(), Self::Error>;

    /// Drop any registered handler.  Returns `Ok(())` when none exists.
    fn remove_event_detect(&self, pin: PinId) -> Result<(), Self::Error>;

    /// Return the line to its reset state once its owning device is gone.
    fn release(&self, pin: PinId) -> Result<(), Self::Error>;
}

// ───────────────────────────────────────────────────────────────
// Edge event sink (driven by controller: hardware → user code)
// ───────────────────────────────────────────────────────────────

/// Receives debounced edge events for one pin.
///
/// Handlers must not assume they run on the thread that registered them.
pub trait EdgeHandler: Send + 'static {
    fn on_edge(&mut self, pin: PinId);
}

impl<F> EdgeHandler for F
where
    F: FnMut(PinId) + Send + 'static,
{
    fn on_edge(&mut self, pin: PinId) {
        self(pin);
    }
}

// ───────────────────────────────────────────────────────────────
// Thermal probe (driven adapter: one-wire driver → device)
// ───────────────────────────────────────────────────────────────

/// A temperature source such as a DS18B20 on a one-wire bus.
pub trait ThermalProbe: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Temperature in degrees Celsius.
    fn get_temperature(&self) -> Result<f64, Self::Error>;
}

// ───────────────────────────────────────────────────────────────
// Clock (driven adapter: timing source for busy-poll measurements)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.
pub trait Clock: Send + Sync {
    /// Time since an arbitrary fixed epoch.
    fn now(&self) -> Duration;

    /// Suspend the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

impl<K: Clock + ?Sized> Clock for std::sync::Arc<K> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}
