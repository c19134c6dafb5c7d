//! Cancelable background worker used by polling devices.
//!
//! A [`SamplerThread`] owns one named OS thread and a [`StopSignal`].  The
//! work function receives a clone of the signal and is expected to sleep
//! through [`StopSignal::wait_timeout`] between iterations, so raising the
//! signal is observed within one sampling period.
//!
//! ```text
//!   owner ── stop() ──▶ StopSignal ◀── wait_timeout(interval) ── work loop
//!   owner ── join() ──────────────────────────────────────────▶ JoinHandle
//! ```

use core::time::Duration;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::JoinHandle;

use log::{info, warn};

// ───────────────────────────────────────────────────────────────
// StopSignal
// ───────────────────────────────────────────────────────────────

/// One-way cancellation flag with an interruptible sleep.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal and wake every waiter.  Raising twice is harmless.
    pub fn raise(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `timeout` or until raised, whichever comes first.
    /// Returns `true` if the signal is raised.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |raised| !*raised)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

// ───────────────────────────────────────────────────────────────
// SamplerThread
// ───────────────────────────────────────────────────────────────

/// Handle to a running background worker.
///
/// Dropping the handle stops the worker and waits for it to exit.
pub struct SamplerThread {
    name: String,
    stop: StopSignal,
    handle: Option<JoinHandle<()>>,
}

impl SamplerThread {
    /// Spawn `work` on a new thread named `name`.
    pub fn spawn<F>(name: impl Into<String>, work: F) -> std::io::Result<Self>
    where
        F: FnOnce(StopSignal) + Send + 'static,
    {
        let name = name.into();
        let stop = StopSignal::new();
        let worker_stop = stop.clone();

        info!("Spawning sampler '{}'", name);
        let handle = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || work(worker_stop))?;

        Ok(Self {
            name,
            stop,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A clone of the worker's stop signal.
    pub fn signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Raise the stop signal without waiting for the worker.
    pub fn stop(&self) {
        self.stop.raise();
    }

    /// Whether the worker function has returned (or was already joined).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Block until the worker function returns.  Subsequent calls return
    /// immediately.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Sampler '{}' panicked", self.name);
            } else {
                info!("Sampler '{}' stopped", self.name);
            }
        }
    }

    pub fn stop_and_join(&mut self) {
        self.stop();
        self.join();
    }
}

impl Drop for SamplerThread {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
