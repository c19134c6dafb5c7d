//! Sensor devices built on the [`PinController`](crate::ports::PinController)
//! and [`ThermalProbe`](crate::ports::ThermalProbe) ports.
//!
//! | Device                | Module        | Drives the pin via          |
//! |-----------------------|---------------|-----------------------------|
//! | `DigitalInputDevice`  | `input`       | controller, input only      |
//! | `MotionSensor`        | `motion`      | `DigitalInputDevice` + sampler thread |
//! | `LightSensor`         | `light`       | controller, output/input switching |
//! | `TemperatureSensor`   | `temperature` | one-wire probe              |

pub mod input;
pub mod light;
pub mod motion;
pub mod temperature;
pub mod window;
