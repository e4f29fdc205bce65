#![deny(missing_docs)]
//! Lock-free timing counters for the frame pipeline.
//!
//! Every field is an independent `AtomicU64`. Snapshots read the fields one
//! by one, so a snapshot taken while writers are active may pair a total with
//! a count that does not include it yet. That is acceptable for monitoring
//! and is the only consistency these types offer.

mod duration;
mod pipeline;

pub use duration::{DurationMetric, MetricSnapshot};
pub use pipeline::{Phase, PipelineMetrics, PipelineSnapshot};
