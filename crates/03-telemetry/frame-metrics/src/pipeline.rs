use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::{DurationMetric, MetricSnapshot};

/// Timed phases of one pipeline cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Whole update-to-publish cycle.
    Loop,
    /// Caller's update callback.
    Update,
    /// Caller's render callback.
    Render,
    /// Presentation of the front buffer by the display loop.
    Draw,
}

impl Phase {
    /// Every phase, in reporting order.
    pub const ALL: [Phase; 4] = [Phase::Loop, Phase::Update, Phase::Render, Phase::Draw];

    /// Stable label used in log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Loop => "loop",
            Phase::Update => "update",
            Phase::Render => "render",
            Phase::Draw => "draw",
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Metrics shared by the pipeline threads and the display loop.
///
/// Meant to live behind an `Arc`. Like [`DurationMetric`], snapshots are
/// weakly consistent: each counter is exact on its own, but phases and
/// counters are read at slightly different moments.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    phases: [DurationMetric; 4],
    deferred_renders: AtomicU64,
    superseded_frames: AtomicU64,
}

impl PipelineMetrics {
    /// Empty metrics.
    pub const fn new() -> Self {
        Self {
            phases: [
                DurationMetric::new(),
                DurationMetric::new(),
                DurationMetric::new(),
                DurationMetric::new(),
            ],
            deferred_renders: AtomicU64::new(0),
            superseded_frames: AtomicU64::new(0),
        }
    }

    /// Metric backing `phase`.
    pub fn phase(&self, phase: Phase) -> &DurationMetric {
        &self.phases[phase.slot()]
    }

    /// Records one `phase` operation of length `elapsed`.
    pub fn record(&self, phase: Phase, elapsed: Duration) {
        self.phase(phase).record(elapsed);
    }

    /// Times `f` under `phase`.
    pub fn time<T>(&self, phase: Phase, f: impl FnOnce() -> T) -> T {
        self.phase(phase).time(f)
    }

    /// Counts a render deferred because no back buffer was free.
    pub fn note_deferred_render(&self) {
        self.deferred_renders.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts an updated frame replaced by a fresher one before it was drawn.
    pub fn note_superseded_frame(&self) {
        self.superseded_frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads every field.
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            phases: Phase::ALL.map(|phase| self.phase(phase).snapshot()),
            deferred_renders: self.deferred_renders.load(Ordering::Relaxed),
            superseded_frames: self.superseded_frames.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PipelineMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineSnapshot {
    phases: [MetricSnapshot; 4],
    /// Renders that had to wait for the reader to free a buffer.
    pub deferred_renders: u64,
    /// Updated frames that were never drawn because a fresher one arrived.
    pub superseded_frames: u64,
}

impl PipelineSnapshot {
    /// Snapshot of one phase.
    pub fn phase(&self, phase: Phase) -> MetricSnapshot {
        self.phases[phase.slot()]
    }

    /// Activity recorded between `earlier` and `self`.
    pub fn since(&self, earlier: &PipelineSnapshot) -> PipelineSnapshot {
        PipelineSnapshot {
            phases: Phase::ALL.map(|phase| self.phase(phase).since(&earlier.phase(phase))),
            deferred_renders: self.deferred_renders.saturating_sub(earlier.deferred_renders),
            superseded_frames: self
                .superseded_frames
                .saturating_sub(earlier.superseded_frames),
        }
    }
}

impl fmt::Display for PipelineSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for phase in Phase::ALL {
            write!(f, "{}: {}, ", phase.as_str(), self.phase(phase))?;
        }
        write!(
            f,
            "deferred: {}, superseded: {}",
            self.deferred_renders, self.superseded_frames
        )
    }
}
