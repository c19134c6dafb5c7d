//! Light level estimate from the charge time of an RC circuit.
//!
//! ## Hardware
//!
//! An LDR in series with a capacitor, the junction wired to one GPIO.
//! Driving the pin LOW empties the capacitor; releasing it to a floating
//! input lets the capacitor charge through the LDR until the pin reads
//! HIGH.
//!
//! ## Scoring
//!
//! ```text
//!   elapsed = min(charge time, darkness_level)
//!   score   = 100 - 100 * elapsed / darkness_level
//! ```
//!
//! A charge that times out scores 0.  The score polarity follows the
//! circuit above and must not be flipped.  [`LightSensor::value`] averages
//! five scores, serially on the calling thread.

use core::time::Duration;
use std::sync::Arc;

use log::trace;

use crate::adapters::time::MonotonicClock;
use crate::config::{LightSensorConfig, require_pin, validate_darkness_level};
use crate::error::{Error, Result};
use crate::pins::{Level, PinId, PinMode, Pull};
use crate::ports::{Clock, PinController};

/// Measurements averaged by [`LightSensor::value`].
pub const SAMPLES_PER_READING: usize = 5;

/// Time the pin is held LOW to discharge the capacitor.
pub const DISCHARGE_SETTLE: Duration = Duration::from_millis(100);

pub struct LightSensor<C: PinController, K: Clock = MonotonicClock> {
    controller: Arc<C>,
    clock: K,
    pin: PinId,
    darkness_level: Duration,
}

impl<C: PinController> LightSensor<C> {
    pub fn new(controller: Arc<C>, config: LightSensorConfig) -> Result<Self, C::Error> {
        Self::with_clock(controller, config, MonotonicClock::new())
    }
}

impl<C: PinController, K: Clock> LightSensor<C, K> {
    pub fn with_clock(
        controller: Arc<C>,
        config: LightSensorConfig,
        clock: K,
    ) -> Result<Self, C::Error> {
        let pin = require_pin(config.pin, &*controller)?;
        let darkness_level = validate_darkness_level(config.darkness_level_secs)?;
        Ok(Self {
            controller,
            clock,
            pin,
            darkness_level,
        })
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn darkness_level(&self) -> Duration {
        self.darkness_level
    }

    pub fn set_darkness_level(&mut self, secs: f64) -> Result<(), C::Error> {
        self.darkness_level = validate_darkness_level(secs)?;
        Ok(())
    }

    /// Average of [`SAMPLES_PER_READING`] independent scores.
    pub fn value(&self) -> Result<f64, C::Error> {
        let mut total = 0.0;
        for _ in 0..SAMPLES_PER_READING {
            total += self.sample()?;
        }
        Ok(total / SAMPLES_PER_READING as f64)
    }

    /// One score in `0.0..=100.0`.
    pub fn sample(&self) -> Result<f64, C::Error> {
        let elapsed = self.charge_time()?;
        let raw = 100.0 * elapsed.as_secs_f64() / self.darkness_level.as_secs_f64();
        Ok(100.0 - raw)
    }

    /// Discharge, release, and time the charge, capped at the darkness level.
    ///
    /// The end timestamp is taken on every poll, including the one that
    /// ends the loop, so a timeout reports exactly `darkness_level`.
    pub fn charge_time(&self) -> Result<Duration, C::Error> {
        let c = &*self.controller;
        c.setup(self.pin, PinMode::Output(Level::Low)).map_err(Error::Pin)?;
        c.output(self.pin, Level::Low).map_err(Error::Pin)?;
        self.clock.sleep(DISCHARGE_SETTLE);
        c.setup(self.pin, PinMode::Input(Pull::Off)).map_err(Error::Pin)?;

        let start = self.clock.now();
        let elapsed = loop {
            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= self.darkness_level {
                trace!("light: GPIO{} charge timed out", self.pin);
                break elapsed;
            }
            if c.input(self.pin).map_err(Error::Pin)?.is_high() {
                break elapsed;
            }
        };

        Ok(elapsed.min(self.darkness_level))
    }
}

impl<C: PinController, K: Clock> core::fmt::Debug for LightSensor<C, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LightSensor")
            .field("pin", &self.pin)
            .field("darkness_level", &self.darkness_level)
            .finish_non_exhaustive()
    }
}
