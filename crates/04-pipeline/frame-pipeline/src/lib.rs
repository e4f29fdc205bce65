#![deny(missing_docs)]
//! Tick-to-pixels stages of the frame pipeline.
//!
//! [`FrameAssembler`] pairs each clock tick with the events that arrived since
//! the previous one. [`PipelineStage`] folds those frames through the caller's
//! [`Update`] callback and draws the freshest result with [`Render`] into the
//! back buffer of a [`framebuffer::double_buffer`] pair.

mod assembler;
mod error;
mod frame;
mod stage;

pub use assembler::{AssemblerHandle, AssemblerStats, FrameAssembler};
pub use error::{StageError, StageResult};
pub use frame::{EventBatch, Frame};
pub use stage::{PipelineStage, Render, Update};
