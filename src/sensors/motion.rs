//! Passive-infrared motion sensor with majority-vote smoothing.
//!
//! A PIR output chatters, so a single read is a poor answer to "is anyone
//! there".  A background sampler reads the line at `sample_rate_hz` into a
//! [`RollingWindow`] of `queue_len` samples and queries report a strict
//! majority over that window.
//!
//! ## Phases
//!
//! | Phase     | Entered when                         | Sampler behaviour          |
//! |-----------|--------------------------------------|----------------------------|
//! | `Filling` | construction                         | append until full          |
//! | `Steady`  | the push that fills the window       | append, evict oldest       |
//!
//! The transition happens once and is never undone.  Non-partial queries
//! wait for it.

use core::time::Duration;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use log::{debug, error};

use crate::config::MotionSensorConfig;
use crate::drivers::sampler::{SamplerThread, StopSignal};
use crate::error::{Error, Result};
use crate::pins::PinId;
use crate::ports::PinController;
use crate::sensors::input::DigitalInputDevice;
use crate::sensors::window::RollingWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Filling,
    Steady,
}

#[derive(Debug)]
struct WindowState {
    window: RollingWindow,
    phase: Phase,
}

/// Window and latch shared between the sampler and query callers.
#[derive(Debug)]
struct Shared {
    state: Mutex<WindowState>,
    filled: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct MotionSensor<C: PinController> {
    device: Arc<DigitalInputDevice<C>>,
    shared: Arc<Shared>,
    sample_rate_hz: f64,
    partial: bool,
    sampler: SamplerThread,
}

impl<C: PinController> MotionSensor<C> {
    /// Configure the input and start sampling immediately.
    ///
    /// `queue_len` must lie in `1..=MAX_QUEUE_LEN` (256); the window is
    /// fixed-capacity storage and larger windows are rejected with
    /// [`ConfigError::ValidationFailed`](crate::ConfigError::ValidationFailed).
    /// So is a sample rate whose interval does not fit in a `Duration`.
    pub fn new(controller: Arc<C>, config: MotionSensorConfig) -> Result<Self, C::Error> {
        config.validate()?;
        let interval = config.sample_interval()?;
        let device = Arc::new(DigitalInputDevice::new(controller, config.input)?);
        let shared = Arc::new(Shared {
            state: Mutex::new(WindowState {
                window: RollingWindow::new(config.queue_len),
                phase: Phase::Filling,
            }),
            filled: Condvar::new(),
        });

        let sampler = {
            let device = Arc::clone(&device);
            let shared = Arc::clone(&shared);
            SamplerThread::spawn(format!("motion-{}", device.pin()), move |stop| {
                sample_loop(&device, &shared, interval, &stop);
            })
            .map_err(Error::Spawn)?
        };

        Ok(Self {
            device,
            shared,
            sample_rate_hz: config.sample_rate_hz,
            partial: config.partial,
            sampler,
        })
    }

    pub fn pin(&self) -> PinId {
        self.device.pin()
    }

    /// Capacity of the rolling window.
    pub fn queue_len(&self) -> usize {
        self.shared.lock().window.capacity()
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    pub fn partial(&self) -> bool {
        self.partial
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().phase
    }

    /// Current window contents, oldest first.
    pub fn samples(&self) -> Vec<bool> {
        self.shared.lock().window.iter().collect()
    }

    /// Whether the background sampler is still running.
    pub fn sampler_running(&self) -> bool {
        !self.sampler.is_finished()
    }

    /// Instantaneous read of the line, bypassing the window.
    pub fn is_active(&self) -> Result<bool, C::Error> {
        self.device.is_active()
    }

    /// Strict-majority vote over the window.
    ///
    /// Unless `partial`, blocks until the window has filled once.  That wait
    /// is unbounded: if the sampler stopped before filling, it never returns.
    pub fn motion_detected(&self) -> bool {
        let state = self.shared.lock();
        let state = if self.partial {
            state
        } else {
            self.shared
                .filled
                .wait_while(state, |s| s.phase == Phase::Filling)
                .unwrap_or_else(PoisonError::into_inner)
        };
        state.window.majority()
    }

    /// [`motion_detected`](Self::motion_detected) giving up after `timeout`.
    /// Returns `None` if the window has not filled by then.
    pub fn motion_detected_timeout(&self, timeout: Duration) -> Option<bool> {
        let state = self.shared.lock();
        if self.partial {
            return Some(state.window.majority());
        }
        let (state, _) = self
            .shared
            .filled
            .wait_timeout_while(state, timeout, |s| s.phase == Phase::Filling)
            .unwrap_or_else(PoisonError::into_inner);
        match state.phase {
            Phase::Steady => Some(state.window.majority()),
            Phase::Filling => None,
        }
    }

    /// Stop the sampler and wait for it to exit.  The window keeps its
    /// last contents.  Idempotent.
    pub fn stop(&mut self) {
        self.sampler.stop_and_join();
    }
}

impl<C: PinController> Drop for MotionSensor<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<C: PinController> core::fmt::Debug for MotionSensor<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MotionSensor")
            .field("device", &self.device)
            .field("sample_rate_hz", &self.sample_rate_hz)
            .field("partial", &self.partial)
            .finish_non_exhaustive()
    }
}

fn sample_loop<C: PinController>(
    device: &DigitalInputDevice<C>,
    shared: &Shared,
    interval: Duration,
    stop: &StopSignal,
) {
    while !stop.wait_timeout(interval) {
        let active = match device.is_active() {
            Ok(active) => active,
            Err(e) => {
                error!("motion: GPIO{} read failed, sampler exiting: {}", device.pin(), e);
                return;
            }
        };

        let mut state = shared.lock();
        state.window.push(active);
        if state.phase == Phase::Filling && state.window.is_full() {
            state.phase = Phase::Steady;
            debug!(
                "motion: GPIO{} window filled ({} samples)",
                device.pin(),
                state.window.len()
            );
            shared.filled.notify_all();
        }
    }
}
