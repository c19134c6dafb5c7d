//! Digital input device: one GPIO line with an active/inactive mapping.
//!
//! ## Hardware
//!
//! The default configuration suits a momentary switch to ground: the line
//! is pulled up, reads LOW while pressed, and a press is a falling edge.
//! [`DigitalInputDevice::button`] builds exactly that; there is no
//! separate button type.
//!
//! ## Lifecycle
//!
//! The pin is configured as input during construction and never
//! reconfigured.  Dropping the device releases the pin on the controller.

use core::time::Duration;
use std::sync::Arc;

use log::{debug, warn};

use crate::config::{DEFAULT_DEBOUNCE, InputConfig, require_pin};
use crate::error::{Error, Result};
use crate::pins::{Edge, Level, PinId, PinMode, Pull};
use crate::ports::{EdgeHandler, PinController};

pub struct DigitalInputDevice<C: PinController> {
    controller: Arc<C>,
    pin: PinId,
    pull: Pull,
    edge: Edge,
    active_state: Level,
    inactive_state: Level,
}

impl<C: PinController> DigitalInputDevice<C> {
    pub fn new(controller: Arc<C>, config: InputConfig) -> Result<Self, C::Error> {
        let pin = require_pin(config.pin, &*controller)?;
        controller
            .setup(pin, PinMode::Input(config.pull))
            .map_err(Error::Pin)?;
        debug!(
            "input: GPIO{} configured (pull={:?}, edge={:?}, active={:?})",
            pin, config.pull, config.edge, config.active_state
        );

        Ok(Self {
            controller,
            pin,
            pull: config.pull,
            edge: config.edge,
            active_state: config.active_state,
            inactive_state: !config.active_state,
        })
    }

    /// Momentary push-button preset (pull-up, falling edge, active low).
    pub fn button(controller: Arc<C>, pin: PinId) -> Result<Self, C::Error> {
        Self::new(controller, InputConfig::button(pin))
    }

    /// GPIO pin this device is attached to.
    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn pull(&self) -> Pull {
        self.pull
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn active_state(&self) -> Level {
        self.active_state
    }

    pub fn inactive_state(&self) -> Level {
        self.inactive_state
    }

    /// Raw level as read from the controller.
    pub fn level(&self) -> Result<Level, C::Error> {
        self.controller.input(self.pin).map_err(Error::Pin)
    }

    /// Whether the line currently reads the active level.
    pub fn is_active(&self) -> Result<bool, C::Error> {
        Ok(self.level()? == self.active_state)
    }

    /// Block until the configured edge occurs.  There is no timeout.
    pub fn wait_for_edge(&self) -> Result<(), C::Error> {
        self.controller
            .wait_for_edge(self.pin, self.edge)
            .map_err(Error::Pin)
    }

    /// Invoke `handler` on each configured edge, ignoring retriggers
    /// within `debounce`.
    pub fn add_callback<H: EdgeHandler>(
        &self,
        handler: H,
        debounce: Duration,
    ) -> Result<(), C::Error> {
        debug!(
            "input: GPIO{} callback on {:?} (debounce={}ms)",
            self.pin,
            self.edge,
            debounce.as_millis()
        );
        self.controller
            .add_event_detect(self.pin, self.edge, Box::new(handler), debounce)
            .map_err(Error::Pin)
    }

    /// [`add_callback`](Self::add_callback) with a one-second debounce.
    pub fn add_callback_default<H: EdgeHandler>(&self, handler: H) -> Result<(), C::Error> {
        self.add_callback(handler, DEFAULT_DEBOUNCE)
    }

    /// Drop any registered callback.  Safe to call when none exists.
    pub fn remove_callback(&self) -> Result<(), C::Error> {
        debug!("input: GPIO{} callback removed", self.pin);
        self.controller
            .remove_event_detect(self.pin)
            .map_err(Error::Pin)
    }
}

impl<C: PinController> Drop for DigitalInputDevice<C> {
    fn drop(&mut self) {
        if let Err(e) = self.controller.release(self.pin) {
            warn!("input: GPIO{} release failed: {}", self.pin, e);
        }
    }
}

impl<C: PinController> core::fmt::Debug for DigitalInputDevice<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DigitalInputDevice")
            .field("pin", &self.pin)
            .field("pull", &self.pull)
            .field("edge", &self.edge)
            .field("active_state", &self.active_state)
            .finish_non_exhaustive()
    }
}

// ── embedded-hal interop ─────────────────────────────────────

impl<C: PinController> embedded_hal::digital::ErrorType for DigitalInputDevice<C> {
    type Error = Error<C::Error>;
}

impl<C: PinController> embedded_hal::digital::InputPin for DigitalInputDevice<C> {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.level()?.is_high())
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.level()?.is_low())
    }
}
