//! Unified error types for pinsense devices.
//!
//! Construction problems are reported as [`ConfigError`] at the call that
//! detects them.  Failures inside a [`PinController`](crate::ports::PinController)
//! are carried verbatim in [`Error::Pin`] and those of a
//! [`ThermalProbe`](crate::ports::ThermalProbe) in [`Error::Probe`], so
//! callers can match on the adapter's own error type.  Nothing in this crate retries.

use core::fmt;

use crate::pins::PinId;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// A required construction parameter is missing or out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No GPIO pin was given.
    MissingPin,
    /// The controller does not drive this pin.
    InvalidPin(PinId),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPin => write!(f, "no GPIO pin number given"),
            Self::InvalidPin(pin) => write!(f, "GPIO pin {pin} is not available"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Device errors
// ---------------------------------------------------------------------------

/// Every fallible device operation funnels into this type.
///
/// `E` is the error type of the pin controller (or probe) behind the device.
#[derive(Debug)]
pub enum Error<E> {
    /// Invalid construction parameters.
    Config(ConfigError),
    /// The underlying controller failed; passed through unchanged.
    Pin(E),
    /// The thermal probe failed; passed through unchanged.
    Probe(E),
    /// The background sampling thread could not be created.
    Spawn(std::io::Error),
}

impl<E> Error<E> {
    /// The configuration error, if this is one.
    pub fn as_config(&self) -> Option<ConfigError> {
        match self {
            Self::Config(e) => Some(*e),
            _ => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Pin(e) => write!(f, "pin: {e}"),
            Self::Probe(e) => write!(f, "probe: {e}"),
            Self::Spawn(e) => write!(f, "sampler spawn: {e}"),
        }
    }
}

impl<E> std::error::Error for Error<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Pin(e) | Self::Probe(e) => Some(e),
            Self::Spawn(e) => Some(e),
        }
    }
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl<E: fmt::Debug> embedded_hal::digital::Error for Error<E> {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias, parameterised by the controller error.
pub type Result<T, E> = core::result::Result<T, Error<E>>;
