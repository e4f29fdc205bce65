use thiserror::Error;

/// Result of running a [`PipelineStage`](crate::PipelineStage).
pub type StageResult<T, E> = Result<T, StageError<E>>;

/// Failure raised by a caller-supplied callback.
///
/// Shutdown of the surrounding pipeline is not an error; the stage returns
/// its final state instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError<E> {
    /// The update callback failed.
    #[error("update callback failed: {0}")]
    Update(#[source] E),

    /// The render callback failed.
    #[error("render callback failed: {0}")]
    Render(#[source] E),
}

impl<E> StageError<E> {
    /// The callback's own error.
    pub fn into_inner(self) -> E {
        match self {
            StageError::Update(err) | StageError::Render(err) => err,
        }
    }
}
