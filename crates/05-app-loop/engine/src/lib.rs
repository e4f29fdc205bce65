#![deny(missing_docs)]
//! Composition root of the frame pipeline.
//!
//! [`Engine`] wires a [`tick_clock::TickClock`], a
//! [`frame_pipeline::FrameAssembler`] and a [`frame_pipeline::PipelineStage`]
//! to a [`framebuffer::double_buffer`] pair, and hands the reader half to the
//! caller's display loop as a [`DisplaySurface`].

mod config;
mod engine;
mod error;
mod reporter;

pub use config::{ConfigError, EngineConfig};
pub use engine::{DisplaySurface, Engine, EngineHandle};
pub use error::{EngineError, EngineResult};

pub use frame_metrics::{Phase, PipelineMetrics, PipelineSnapshot};
pub use frame_pipeline::{Frame, Render, StageError, Update};
pub use framebuffer::{PixelBuffer, Rect, Rgba};
pub use tick_clock::{CancelToken, Fps, Tick};
