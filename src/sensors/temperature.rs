//! One-wire thermal sensor.
//!
//! A thin wrapper: the probe driver does all the work and its reading is
//! returned unchanged.  See [`W1Probe`](crate::adapters::w1::W1Probe) for
//! the Linux sysfs driver.

use crate::error::{Error, Result};
use crate::ports::ThermalProbe;

#[derive(Debug)]
pub struct TemperatureSensor<P: ThermalProbe> {
    probe: P,
}

impl<P: ThermalProbe> TemperatureSensor<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Temperature in degrees Celsius.
    pub fn value(&self) -> Result<f64, P::Error> {
        self.probe.get_temperature().map_err(Error::Probe)
    }
}
