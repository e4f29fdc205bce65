//! Tick timestamps and rate helpers.

use std::time::{Duration, Instant};

/// One fixed-rate time step.
///
/// A tick records when the clock started (`zero`), when the previously
/// emitted tick fired (`previous`) and when this one fired (`current`).
/// `current` never moves backwards, so `delta` is never negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    zero: Instant,
    previous: Instant,
    current: Instant,
    index: u64,
}

impl Tick {
    /// Creates the origin tick for a clock that started at `now`.
    pub fn origin(now: Instant) -> Self {
        Self {
            zero: now,
            previous: now,
            current: now,
            index: 0,
        }
    }

    /// Advances to `now`, producing the next tick in the sequence.
    ///
    /// A `now` earlier than the current timestamp is clamped so the sequence
    /// stays monotonic.
    pub fn step(&self, now: Instant) -> Self {
        Self {
            zero: self.zero,
            previous: self.current,
            current: now.max(self.current),
            index: self.index + 1,
        }
    }

    /// Time elapsed since the previous tick.
    pub fn delta(&self) -> Duration {
        self.current.saturating_duration_since(self.previous)
    }

    /// Time elapsed since the clock started.
    pub fn age(&self) -> Duration {
        self.current.saturating_duration_since(self.zero)
    }

    /// Instant the clock started.
    pub fn zero(&self) -> Instant {
        self.zero
    }

    /// Instant of the previous tick.
    pub fn previous(&self) -> Instant {
        self.previous
    }

    /// Instant this tick fired.
    pub fn now(&self) -> Instant {
        self.current
    }

    /// Number of steps taken since the origin tick.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Returns `true` for the origin tick.
    pub fn is_origin(&self) -> bool {
        self.index == 0
    }
}

/// Frames (or ticks) per second.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Fps(pub f64);

impl Fps {
    /// Interval between two ticks at this rate.
    ///
    /// Returns `None` for rates that are zero, negative, non-finite or too
    /// small to express as a [`Duration`].
    pub fn interval(self) -> Option<Duration> {
        if !self.0.is_finite() || self.0 <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(1.0 / self.0)
            .ok()
            .filter(|interval| !interval.is_zero())
    }

    /// Rate matching a fixed interval. A zero interval maps to infinity.
    pub fn from_interval(interval: Duration) -> Self {
        if interval.is_zero() {
            return Self(f64::INFINITY);
        }
        Self(1.0 / interval.as_secs_f64())
    }
}
