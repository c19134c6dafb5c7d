//! Mock pin controller and clock for integration tests.
//!
//! Records every controller call so tests can assert on the full command
//! history without touching real GPIO lines.  Levels are set by the test;
//! transitions that match a registered edge wake `wait_for_edge` callers
//! and invoke edge handlers on the test's thread.  A handler is not invoked
//! again until its debounce interval has passed since it last ran.

use core::time::Duration;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Instant;

use pinsense::{Clock, Edge, EdgeHandler, Level, PinController, PinId, PinMode, Pull};

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PinCall {
    Setup { pin: PinId, mode: PinMode },
    Output { pin: PinId, level: Level },
    AddEventDetect { pin: PinId, edge: Edge, debounce: Duration },
    RemoveEventDetect { pin: PinId },
    Release { pin: PinId },
}

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockError {
    ReadFailed(PinId),
}

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ReadFailed(pin) => write!(f, "read of GPIO{} failed", pin),
        }
    }
}

impl std::error::Error for MockError {}

// ── MockPinController ─────────────────────────────────────────

type SharedHandler = Arc<Mutex<Box<dyn EdgeHandler>>>;

struct Registration {
    edge: Edge,
    debounce: Duration,
    last_fired: Option<Instant>,
    handler: SharedHandler,
}

#[derive(Default)]
struct MockState {
    levels: HashMap<PinId, Level>,
    scripts: HashMap<PinId, VecDeque<Level>>,
    handlers: HashMap<PinId, Registration>,
    rising: HashMap<PinId, u64>,
    falling: HashMap<PinId, u64>,
    waiting: HashMap<PinId, usize>,
    failing: HashSet<PinId>,
    reads: HashMap<PinId, usize>,
    calls: Vec<PinCall>,
}

pub struct MockPinController {
    pin_count: PinId,
    state: Mutex<MockState>,
    edges: Condvar,
}

#[allow(dead_code)]
impl MockPinController {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pin_count: 28,
            state: Mutex::new(MockState::default()),
            edges: Condvar::new(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Drive the line to `level` as the outside world would.
    pub fn set_level(&self, pin: PinId, level: Level) {
        let handler = {
            let mut s = self.lock();
            let previous = s.levels.insert(pin, level).unwrap_or(!level);
            if previous == level {
                return;
            }
            if Edge::Rising.matches(previous, level) {
                *s.rising.entry(pin).or_default() += 1;
            } else {
                *s.falling.entry(pin).or_default() += 1;
            }
            self.edges.notify_all();
            let Some(reg) = s.handlers.get_mut(&pin) else {
                return;
            };
            if !reg.edge.matches(previous, level) {
                return;
            }
            let now = Instant::now();
            if reg.last_fired.is_some_and(|t| now.duration_since(t) < reg.debounce) {
                return;
            }
            reg.last_fired = Some(now);
            Arc::clone(&reg.handler)
        };
        handler.lock().unwrap().on_edge(pin);
    }

    /// Queue levels returned by successive `input` calls before falling
    /// back to the current level.
    pub fn script(&self, pin: PinId, levels: impl IntoIterator<Item = Level>) {
        self.lock().scripts.entry(pin).or_default().extend(levels);
    }

    /// Make every subsequent `input(pin)` fail.
    pub fn fail_reads(&self, pin: PinId) {
        self.lock().failing.insert(pin);
    }

    pub fn calls(&self) -> Vec<PinCall> {
        self.lock().calls.clone()
    }

    pub fn reads(&self, pin: PinId) -> usize {
        self.lock().reads.get(&pin).copied().unwrap_or(0)
    }

    pub fn has_handler(&self, pin: PinId) -> bool {
        self.lock().handlers.contains_key(&pin)
    }

    /// Spin until `n` threads are blocked in `wait_for_edge(pin)`.
    pub fn wait_for_waiters(&self, pin: PinId, n: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.lock().waiting.get(&pin).copied().unwrap_or(0) < n {
            assert!(Instant::now() < deadline, "no waiter on GPIO{}", pin);
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn edge_count(s: &MockState, pin: PinId, edge: Edge) -> u64 {
        let rising = s.rising.get(&pin).copied().unwrap_or(0);
        let falling = s.falling.get(&pin).copied().unwrap_or(0);
        match edge {
            Edge::Rising => rising,
            Edge::Falling => falling,
            Edge::Both => rising + falling,
        }
    }
}

impl PinController for MockPinController {
    type Error = MockError;

    fn has_pin(&self, pin: PinId) -> bool {
        pin < self.pin_count
    }

    fn setup(&self, pin: PinId, mode: PinMode) -> Result<(), MockError> {
        let mut s = self.lock();
        s.calls.push(PinCall::Setup { pin, mode });
        match mode {
            PinMode::Output(level) => {
                s.levels.insert(pin, level);
            }
            PinMode::Input(pull) => {
                let idle = if pull == Pull::Up { Level::High } else { Level::Low };
                s.levels.entry(pin).or_insert(idle);
            }
        }
        Ok(())
    }

    fn input(&self, pin: PinId) -> Result<Level, MockError> {
        let mut s = self.lock();
        if s.failing.contains(&pin) {
            return Err(MockError::ReadFailed(pin));
        }
        *s.reads.entry(pin).or_default() += 1;
        if let Some(level) = s.scripts.get_mut(&pin).and_then(VecDeque::pop_front) {
            return Ok(level);
        }
        Ok(s.levels.get(&pin).copied().unwrap_or(Level::Low))
    }

    fn output(&self, pin: PinId, level: Level) -> Result<(), MockError> {
        let mut s = self.lock();
        s.calls.push(PinCall::Output { pin, level });
        s.levels.insert(pin, level);
        Ok(())
    }

    fn wait_for_edge(&self, pin: PinId, edge: Edge) -> Result<(), MockError> {
        let mut s = self.lock();
        let seen = Self::edge_count(&s, pin, edge);
        *s.waiting.entry(pin).or_default() += 1;
        let mut s = self
            .edges
            .wait_while(s, |s| Self::edge_count(s, pin, edge) == seen)
            .unwrap();
        *s.waiting.entry(pin).or_default() -= 1;
        Ok(())
    }

    fn add_event_detect(
        &self,
        pin: PinId,
        edge: Edge,
        handler: Box<dyn EdgeHandler>,
        debounce: Duration,
    ) -> Result<(), MockError> {
        let mut s = self.lock();
        s.calls.push(PinCall::AddEventDetect { pin, edge, debounce });
        s.handlers.insert(
            pin,
            Registration {
                edge,
                debounce,
                last_fired: None,
                handler: Arc::new(Mutex::new(handler)),
            },
        );
        Ok(())
    }

    fn remove_event_detect(&self, pin: PinId) -> Result<(), MockError> {
        let mut s = self.lock();
        s.calls.push(PinCall::RemoveEventDetect { pin });
        s.handlers.remove(&pin);
        Ok(())
    }

    fn release(&self, pin: PinId) -> Result<(), MockError> {
        let mut s = self.lock();
        s.calls.push(PinCall::Release { pin });
        s.handlers.remove(&pin);
        Ok(())
    }
}

// ── StepClock ─────────────────────────────────────────────────

/// Deterministic clock: every `now()` advances time by `step`, every
/// `sleep()` advances it by the requested duration without blocking.
pub struct StepClock {
    nanos: AtomicU64,
    step: Duration,
    slept: AtomicU64,
}

#[allow(dead_code)]
impl StepClock {
    pub fn new(step: Duration) -> Self {
        Self {
            nanos: AtomicU64::new(0),
            step,
            slept: AtomicU64::new(0),
        }
    }

    /// Total time spent in `sleep`.
    pub fn slept(&self) -> Duration {
        Duration::from_nanos(self.slept.load(Ordering::SeqCst))
    }
}

impl Clock for StepClock {
    fn now(&self) -> Duration {
        let step = self.step.as_nanos() as u64;
        Duration::from_nanos(self.nanos.fetch_add(step, Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        let d = duration.as_nanos() as u64;
        self.nanos.fetch_add(d, Ordering::SeqCst);
        self.slept.fetch_add(d, Ordering::SeqCst);
    }
}
