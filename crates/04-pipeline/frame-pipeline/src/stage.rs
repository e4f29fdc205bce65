use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{select, Receiver};
use frame_metrics::{Phase, PipelineMetrics};
use framebuffer::{BackBuffer, BackWriter, PixelBuffer};
use log::{debug, trace, warn};

use crate::{Frame, StageError, StageResult};

/// Simulation step: folds one frame into the state and derives what to draw.
///
/// Implemented for any `FnMut(Frame<Ev>, S) -> Result<(S, R), E>`.
pub trait Update<Ev, S> {
    /// Value handed to the render callback.
    type Render;
    /// Callback failure.
    type Error;

    /// Advances `state` by `frame`.
    fn update(&mut self, frame: Frame<Ev>, state: S) -> Result<(S, Self::Render), Self::Error>;
}

impl<Ev, S, R, E, F> Update<Ev, S> for F
where
    F: FnMut(Frame<Ev>, S) -> Result<(S, R), E>,
{
    type Render = R;
    type Error = E;

    fn update(&mut self, frame: Frame<Ev>, state: S) -> Result<(S, R), E> {
        self(frame, state)
    }
}

/// Draws a render state into a buffer.
///
/// The callback must overwrite everything it owns; buffers are recycled and
/// still hold an older frame when handed out. Implemented for any
/// `FnMut(&R, &mut PixelBuffer) -> Result<(), E>`.
pub trait Render<R> {
    /// Callback failure.
    type Error;

    /// Draws `state` into `buffer`.
    fn render(&mut self, state: &R, buffer: &mut PixelBuffer) -> Result<(), Self::Error>;
}

impl<R, E, F> Render<R> for F
where
    F: FnMut(&R, &mut PixelBuffer) -> Result<(), E>,
{
    type Error = E;

    fn render(&mut self, state: &R, buffer: &mut PixelBuffer) -> Result<(), E> {
        self(state, buffer)
    }
}

/// Update-then-render loop feeding the writer half of a double buffer.
///
/// Only the freshest render state is ever drawn: while the reader still holds
/// the previous publish, new frames keep being folded and replace the render
/// state waiting for a buffer.
pub struct PipelineStage<U, R> {
    update: U,
    render: R,
    writer: BackWriter,
    metrics: Arc<PipelineMetrics>,
}

struct Pending<R> {
    state: R,
    started: Instant,
}

impl<U, R> PipelineStage<U, R> {
    /// Assembles a stage from its callbacks and output buffer.
    pub fn new(update: U, render: R, writer: BackWriter, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            update,
            render,
            writer,
            metrics,
        }
    }

    /// Runs until `frames` disconnects or the reader is dropped, returning the
    /// final state.
    ///
    /// A callback error stops the loop at once and is returned instead.
    pub fn run<Ev, S>(self, frames: &Receiver<Frame<Ev>>, initial: S) -> StageResult<S, U::Error>
    where
        U: Update<Ev, S>,
        R: Render<U::Render, Error = U::Error>,
    {
        let PipelineStage {
            mut update,
            mut render,
            writer,
            metrics,
        } = self;

        let mut state = initial;
        let mut pending: Option<Pending<U::Render>> = None;
        let mut published = 0u64;

        loop {
            let Some(waiting) = pending.take() else {
                let Ok(frame) = frames.recv() else {
                    break;
                };
                let started = Instant::now();
                let (next, drawn) = apply(&mut update, &metrics, frame, state)?;
                state = next;
                pending = Some(Pending {
                    state: drawn,
                    started,
                });
                continue;
            };

            if let Some(back) = writer.try_acquire_back() {
                if !draw(&mut render, &writer, &metrics, waiting, back)? {
                    break;
                }
                published += 1;
                continue;
            }

            metrics.note_deferred_render();
            trace!("back buffer busy; waiting for a fresher frame or a free buffer");
            let step = select! {
                recv(frames) -> frame => Wait::Frame(frame.ok()),
                recv(writer.back_ready()) -> back => Wait::Buffer(back.ok()),
            };
            match step {
                Wait::Frame(Some(frame)) => {
                    metrics.note_superseded_frame();
                    let started = Instant::now();
                    let (next, drawn) = apply(&mut update, &metrics, frame, state)?;
                    state = next;
                    pending = Some(Pending {
                        state: drawn,
                        started,
                    });
                }
                Wait::Buffer(Some(back)) => {
                    if !draw(&mut render, &writer, &metrics, waiting, back)? {
                        break;
                    }
                    published += 1;
                }
                Wait::Frame(None) => break,
                Wait::Buffer(None) => {
                    debug!("framebuffer reader dropped");
                    break;
                }
            }
        }

        debug!("pipeline stage stopped after {published} published frames");
        Ok(state)
    }
}

enum Wait<Ev> {
    Frame(Option<Frame<Ev>>),
    Buffer(Option<BackBuffer>),
}

fn apply<Ev, S, U>(
    update: &mut U,
    metrics: &PipelineMetrics,
    frame: Frame<Ev>,
    state: S,
) -> StageResult<(S, U::Render), U::Error>
where
    U: Update<Ev, S>,
{
    metrics
        .time(Phase::Update, || update.update(frame, state))
        .map_err(|err| {
            warn!("update callback failed; stopping pipeline");
            StageError::Update(err)
        })
}

/// Renders into `back` and publishes it. Returns `false` when the reader is
/// gone.
fn draw<R, T>(
    render: &mut R,
    writer: &BackWriter,
    metrics: &PipelineMetrics,
    pending: Pending<T>,
    mut back: BackBuffer,
) -> StageResult<bool, R::Error>
where
    R: Render<T>,
{
    metrics
        .time(Phase::Render, || render.render(&pending.state, &mut back))
        .map_err(|err| {
            warn!("render callback failed; stopping pipeline");
            StageError::Render(err)
        })?;
    if writer.publish(back).is_err() {
        debug!("framebuffer reader dropped");
        return Ok(false);
    }
    metrics.record(Phase::Loop, pending.started.elapsed());
    Ok(true)
}
