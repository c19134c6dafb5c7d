//! Fixed-capacity FIFO of boolean samples with a majority vote.
//!
//! Storage is a `heapless::Deque` sized for [`MAX_QUEUE_LEN`]; the logical
//! capacity is chosen at runtime and never exceeds it.  Once full, every
//! push evicts the oldest sample.

use heapless::Deque;

use crate::config::MAX_QUEUE_LEN;

#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: Deque<bool, MAX_QUEUE_LEN>,
    capacity: usize,
}

impl RollingWindow {
    /// `capacity` is clamped to `1..=MAX_QUEUE_LEN`.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Deque::new(),
            capacity: capacity.clamp(1, MAX_QUEUE_LEN),
        }
    }

    /// Append a sample, evicting the oldest when at capacity.
    pub fn push(&mut self, sample: bool) {
        if self.samples.len() >= self.capacity {
            let _ = self.samples.pop_front();
        }
        // Capacity <= MAX_QUEUE_LEN and we just made room.
        let _ = self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Number of `true` samples.
    pub fn active_count(&self) -> usize {
        self.samples.iter().filter(|&&s| s).count()
    }

    /// Strictly more than half the samples are `true`.  An empty window
    /// and an exact tie both vote `false`.
    pub fn majority(&self) -> bool {
        self.active_count() * 2 > self.samples.len()
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.samples.iter().copied()
    }
}
