use std::io;

use framebuffer::FramebufferError;
use frame_pipeline::StageError;
use thiserror::Error;
use tick_clock::ClockError;

use crate::ConfigError;

/// Result of starting, running or stopping an [`Engine`](crate::Engine).
pub type EngineResult<T, E> = Result<T, EngineError<E>>;

/// Terminal outcome of an engine run other than a clean stop.
///
/// `E` is the error type shared by the update, render and display callbacks.
#[derive(Debug, Error)]
pub enum EngineError<E> {
    /// The configuration was rejected before any thread started.
    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    /// The tick clock could not start.
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),

    /// The framebuffer pair could not be allocated.
    #[error("framebuffer error: {0}")]
    Framebuffer(#[from] FramebufferError),

    /// A pipeline thread could not be spawned.
    #[error("failed to spawn {0} thread: {1}")]
    Spawn(&'static str, #[source] io::Error),

    /// The update or render callback failed.
    #[error("pipeline failed: {0}")]
    Callback(#[from] StageError<E>),

    /// The display closure passed to [`Engine::run`](crate::Engine::run) failed.
    #[error("display loop failed: {0}")]
    Display(#[source] E),

    /// A pipeline thread panicked.
    #[error("{0} thread panicked")]
    Panicked(&'static str),
}
