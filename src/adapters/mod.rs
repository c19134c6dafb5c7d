//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter | Implements      | Connects to                    |
//! |---------|-----------------|--------------------------------|
//! | `rpi`   | PinController   | Raspberry Pi GPIO via `rppal`  |
//! | `time`  | Clock           | `std::time::Instant`           |
//! | `w1`    | ThermalProbe    | Linux sysfs `w1-therm` driver  |

#[cfg(feature = "rpi")]
pub mod rpi;
pub mod time;
pub mod w1;
