//! Clock providers for call timestamps.
//!
//! Every call record carries a timestamp taken from a [`ClockProvider`].
//! Timestamps handed out by one provider are strictly increasing, which is
//! what makes histories from different scopes mergeable in call order.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Provider trait for call timestamps.
pub trait ClockProvider: Send + Sync {
    /// Hand out the next timestamp. Each call returns a value strictly
    /// greater than every value returned before, until the clock reaches
    /// `u64::MAX` and saturates there.
    fn tick(&self) -> u64;

    /// The most recently handed out timestamp (0 before the first tick).
    fn last(&self) -> u64;
}

/// Which clock a mocker stamps calls with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockKind {
    /// Plain ordinals: 1, 2, 3, ...
    #[default]
    Sequence,
    /// Monotonic nanoseconds since the clock was created.
    System,
}

impl ClockKind {
    /// Build a shared clock of this kind.
    pub fn build(self) -> Arc<dyn ClockProvider> {
        match self {
            Self::Sequence => Arc::new(SequenceClock::new()),
            Self::System => Arc::new(SystemClock::new()),
        }
    }
}

/// Deterministic clock counting calls.
#[derive(Debug, Default)]
pub struct SequenceClock {
    current: AtomicU64,
}

impl SequenceClock {
    /// Create a sequence clock; the first tick returns 1.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a sequence clock whose first tick returns `start + 1`.
    ///
    /// Ticks stop advancing at `u64::MAX`.
    pub fn starting_at(start: u64) -> Self {
        Self {
            current: AtomicU64::new(start),
        }
    }
}

impl ClockProvider for SequenceClock {
    fn tick(&self) -> u64 {
        match self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_add(1)))
        {
            Ok(prev) | Err(prev) => prev.saturating_add(1),
        }
    }

    fn last(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

/// Wall-clock based provider.
///
/// Two calls within the same nanosecond still get distinct timestamps: a
/// reading that does not move past the last one is bumped by one.
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
    last: AtomicU64,
}

impl SystemClock {
    /// Create a system clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last: AtomicU64::new(0),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockProvider for SystemClock {
    fn tick(&self) -> u64 {
        let reading = self.start.elapsed().as_nanos() as u64;
        let mut prev = self.last.load(Ordering::SeqCst);
        loop {
            let next = reading.max(prev.saturating_add(1));
            match self
                .last
                .compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    fn last(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_clock_counts_from_one() {
        let clock = SequenceClock::new();
        assert_eq!(clock.last(), 0);
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.tick(), 2);
        assert_eq!(clock.last(), 2);
    }

    #[test]
    fn sequence_clock_custom_start() {
        let clock = SequenceClock::starting_at(99);
        assert_eq!(clock.tick(), 100);
    }

    #[test]
    fn sequence_clock_saturates_at_max() {
        let clock = SequenceClock::starting_at(u64::MAX - 1);
        assert_eq!(clock.tick(), u64::MAX);
        assert_eq!(clock.tick(), u64::MAX);
        assert_eq!(clock.last(), u64::MAX);
    }

    #[test]
    fn system_clock_is_strictly_increasing() {
        let clock = SystemClock::new();
        let mut prev = 0;
        for _ in 0..1000 {
            let t = clock.tick();
            assert!(t > prev);
            prev = t;
        }
        assert_eq!(clock.last(), prev);
    }

    #[test]
    fn clock_kind_deserializes_snake_case() {
        let kind: ClockKind = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(kind, ClockKind::System);
        assert_eq!(ClockKind::default(), ClockKind::Sequence);
    }
}
