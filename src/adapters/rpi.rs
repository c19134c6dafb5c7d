//! Raspberry Pi pin controller backed by `rppal`.
//!
//! Each configured line lives in its own slot so a thread blocked in
//! [`wait_for_edge`](PinController::wait_for_edge) on one pin never stalls
//! reads of another.  Edge waits poll the interrupt in short slices and
//! release the slot lock between slices.
//!
//! Reconfiguring a line drops the old `rppal` pin and claims it again with
//! the new mode.

use core::fmt;
use core::time::Duration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;
use rppal::gpio::{self, Gpio, InputPin, OutputPin, Trigger};

use crate::pins::{Edge, Level, PinId, PinMode, Pull};
use crate::ports::{EdgeHandler, PinController};

/// BCM lines broken out on the 40-pin header.
const HEADER_PINS: PinId = 28;

/// Longest time an edge wait holds a slot lock.
const EDGE_POLL_SLICE: Duration = Duration::from_millis(50);

// ── Error type ────────────────────────────────────────────────

#[derive(Debug)]
pub enum RpiError {
    /// The `rppal` call failed.
    Gpio(gpio::Error),
    /// The line has not been configured with `setup`.
    NotConfigured(PinId),
    /// The line is configured in the other direction.
    WrongDirection(PinId),
}

impl fmt::Display for RpiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio(e) => write!(f, "rppal: {e}"),
            Self::NotConfigured(pin) => write!(f, "GPIO{pin} is not configured"),
            Self::WrongDirection(pin) => {
                write!(f, "GPIO{pin} is configured in the other direction")
            }
        }
    }
}

impl std::error::Error for RpiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpio(e) => Some(e),
            _ => None,
        }
    }
}

impl From<gpio::Error> for RpiError {
    fn from(e: gpio::Error) -> Self {
        Self::Gpio(e)
    }
}

// ── Line slots ────────────────────────────────────────────────

enum Line {
    Input(InputPin),
    Output(OutputPin),
}

type Slot = Arc<Mutex<Line>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Line> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn input_of(line: &mut Line, pin: PinId) -> Result<&mut InputPin, RpiError> {
    match line {
        Line::Input(input) => Ok(input),
        Line::Output(_) => Err(RpiError::WrongDirection(pin)),
    }
}

fn trigger(edge: Edge) -> Trigger {
    match edge {
        Edge::Rising => Trigger::RisingEdge,
        Edge::Falling => Trigger::FallingEdge,
        Edge::Both => Trigger::Both,
    }
}

fn to_rppal(level: Level) -> gpio::Level {
    match level {
        Level::Low => gpio::Level::Low,
        Level::High => gpio::Level::High,
    }
}

fn from_rppal(level: gpio::Level) -> Level {
    match level {
        gpio::Level::Low => Level::Low,
        gpio::Level::High => Level::High,
    }
}

// ── Controller ────────────────────────────────────────────────

pub struct RppalController {
    gpio: Gpio,
    lines: Mutex<HashMap<PinId, Slot>>,
}

impl RppalController {
    pub fn new() -> Result<Self, RpiError> {
        Ok(Self {
            gpio: Gpio::new()?,
            lines: Mutex::new(HashMap::new()),
        })
    }

    fn lines(&self) -> MutexGuard<'_, HashMap<PinId, Slot>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, pin: PinId) -> Result<Slot, RpiError> {
        self.lines()
            .get(&pin)
            .cloned()
            .ok_or(RpiError::NotConfigured(pin))
    }

    fn claim(&self, pin: PinId, mode: PinMode) -> Result<Line, RpiError> {
        let raw = self.gpio.get(pin)?;
        Ok(match mode {
            PinMode::Input(Pull::Up) => Line::Input(raw.into_input_pullup()),
            PinMode::Input(Pull::Down) => Line::Input(raw.into_input_pulldown()),
            PinMode::Input(Pull::Off) => Line::Input(raw.into_input()),
            PinMode::Output(Level::Low) => Line::Output(raw.into_output_low()),
            PinMode::Output(Level::High) => Line::Output(raw.into_output_high()),
        })
    }
}

impl PinController for RppalController {
    type Error = RpiError;

    fn has_pin(&self, pin: PinId) -> bool {
        pin < HEADER_PINS
    }

    fn setup(&self, pin: PinId, mode: PinMode) -> Result<(), RpiError> {
        let mut lines = self.lines();
        // The previous pin must be dropped before rppal will hand it out again.
        drop(lines.remove(&pin));
        let line = self.claim(pin, mode)?;
        lines.insert(pin, Arc::new(Mutex::new(line)));
        debug!("rpi: GPIO{} set up as {:?}", pin, mode);
        Ok(())
    }

    fn input(&self, pin: PinId) -> Result<Level, RpiError> {
        let slot = self.slot(pin)?;
        let line = lock(&slot);
        Ok(match &*line {
            Line::Input(input) => from_rppal(input.read()),
            Line::Output(output) => Level::from(output.is_set_high()),
        })
    }

    fn output(&self, pin: PinId, level: Level) -> Result<(), RpiError> {
        let slot = self.slot(pin)?;
        let mut line = lock(&slot);
        match &mut *line {
            Line::Output(output) => {
                output.write(to_rppal(level));
                Ok(())
            }
            Line::Input(_) => Err(RpiError::WrongDirection(pin)),
        }
    }

    fn wait_for_edge(&self, pin: PinId, edge: Edge) -> Result<(), RpiError> {
        let slot = self.slot(pin)?;
        input_of(&mut lock(&slot), pin)?.set_interrupt(trigger(edge), None)?;

        let mut reset = true;
        loop {
            let mut line = lock(&slot);
            let input = input_of(&mut line, pin)?;
            if input.poll_interrupt(reset, Some(EDGE_POLL_SLICE))?.is_some() {
                input.clear_interrupt()?;
                return Ok(());
            }
            reset = false;
        }
    }

    fn add_event_detect(
        &self,
        pin: PinId,
        edge: Edge,
        handler: Box<dyn EdgeHandler>,
        debounce: Duration,
    ) -> Result<(), RpiError> {
        let slot = self.slot(pin)?;
        let mut line = lock(&slot);
        let debounce = (!debounce.is_zero()).then_some(debounce);
        let mut handler = handler;
        input_of(&mut line, pin)?.set_async_interrupt(trigger(edge), debounce, move |_event| {
            handler.on_edge(pin);
        })?;
        Ok(())
    }

    fn remove_event_detect(&self, pin: PinId) -> Result<(), RpiError> {
        let Ok(slot) = self.slot(pin) else {
            return Ok(());
        };
        let mut line = lock(&slot);
        if let Line::Input(input) = &mut *line {
            input.clear_async_interrupt()?;
        }
        Ok(())
    }

    fn release(&self, pin: PinId) -> Result<(), RpiError> {
        if self.lines().remove(&pin).is_some() {
            debug!("rpi: GPIO{} released", pin);
        }
        Ok(())
    }
}
