//! Execution helpers shared by devices.

pub mod sampler;
