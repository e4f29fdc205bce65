use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Operation count plus accumulated duration, updated atomically.
#[derive(Debug, Default)]
pub struct DurationMetric {
    count: AtomicU64,
    total_nanos: AtomicU64,
}

impl DurationMetric {
    /// Empty metric.
    pub const fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            total_nanos: AtomicU64::new(0),
        }
    }

    /// Adds one operation that took `elapsed`.
    pub fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        // Saturates instead of wrapping so the total never decreases.
        let _ = self
            .total_nanos
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |total| {
                Some(total.saturating_add(nanos))
            });
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Runs `f`, records how long it took and returns its result.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let out = f();
        self.record(started.elapsed());
        out
    }

    /// Reads both fields. The pair is not read atomically.
    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            count: self.count.load(Ordering::Relaxed),
            total: Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed)),
        }
    }
}

/// Point-in-time copy of a [`DurationMetric`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricSnapshot {
    /// Number of recorded operations.
    pub count: u64,
    /// Sum of recorded durations.
    pub total: Duration,
}

impl MetricSnapshot {
    /// Mean duration per operation, zero when nothing was recorded.
    pub fn average_duration(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos((self.total.as_nanos() / u128::from(self.count)) as u64)
    }

    /// Operations per second of accumulated time.
    ///
    /// `None` when the total is zero, where the rate is undefined.
    pub fn average_rate(&self) -> Option<f64> {
        let secs = self.total.as_secs_f64();
        (secs > 0.0).then(|| self.count as f64 / secs)
    }

    /// Activity recorded between `earlier` and `self`.
    pub fn since(&self, earlier: &MetricSnapshot) -> MetricSnapshot {
        MetricSnapshot {
            count: self.count.saturating_sub(earlier.count),
            total: self.total.saturating_sub(earlier.total),
        }
    }
}

impl fmt::Display for MetricSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} ops, ", self.count)?;
        if self.total < Duration::from_secs(1) {
            f.write_str("<1s")?;
        } else {
            write!(f, "{}s", self.total.as_secs())?;
        }
        write!(f, " total time, {:?} avg time]", self.average_duration())
    }
}
