use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::Receiver;
use frame_metrics::{Phase, PipelineMetrics};
use frame_pipeline::{
    AssemblerHandle, FrameAssembler, PipelineStage, Render, StageError, StageResult, Update,
};
use framebuffer::{double_buffer, FrontReader, PixelBuffer};
use log::{debug, info, warn};
use tick_clock::{CancelToken, ClockStop, TickClock};

use crate::{reporter, EngineConfig, EngineError, EngineResult};

/// Owns the simulation side of the pipeline until it is spawned.
///
/// `S` is the simulation state folded by the update callback `U`, which hands
/// its render state to `R`.
pub struct Engine<S, U, R> {
    config: EngineConfig,
    initial: S,
    update: U,
    render: R,
}

impl<S, U, R> Engine<S, U, R> {
    /// Engine that will fold `initial` through `update` and draw with `render`.
    pub fn new(config: EngineConfig, initial: S, update: U, render: R) -> Self {
        Self {
            config,
            initial,
            update,
            render,
        }
    }

    /// Configuration the engine will start with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Starts the clock, assembler and pipeline threads.
    ///
    /// The returned surface is the reader half of the framebuffer pair and
    /// belongs to the caller's display loop. Use the handle to stop the
    /// pipeline and collect the final state.
    pub fn spawn<Ev>(
        self,
        events: Receiver<Ev>,
    ) -> EngineResult<(EngineHandle<S, U::Error>, DisplaySurface), U::Error>
    where
        Ev: Send + 'static,
        S: Send + 'static,
        U: Update<Ev, S> + Send + 'static,
        U::Error: Send + 'static,
        R: Render<U::Render, Error = U::Error> + Send + 'static,
    {
        self.config.validate()?;
        let interval = self.config.tick_interval()?;
        let (writer, reader) = double_buffer(self.config.width, self.config.height)?;
        let metrics = Arc::new(PipelineMetrics::new());
        let cancel = CancelToken::new();

        let (ticks, clock) = TickClock::start_with_cancel(interval, cancel.clone())?;
        let (frames, assembler) = FrameAssembler::spawn(ticks, events)
            .map_err(|err| EngineError::Spawn("frame-assembler", err))?;

        let stage = PipelineStage::new(self.update, self.render, writer, Arc::clone(&metrics));
        let initial = self.initial;
        let stage_cancel = cancel.clone();
        let spawned = thread::Builder::new()
            .name("pipeline-stage".into())
            .spawn(move || {
                let outcome = stage.run(&frames, initial);
                stage_cancel.cancel();
                outcome
            });
        let stage = match spawned {
            Ok(stage) => stage,
            Err(err) => {
                clock.stop();
                if assembler.join().is_err() {
                    warn!("frame assembler panicked during startup rollback");
                }
                return Err(EngineError::Spawn("pipeline-stage", err));
            }
        };

        let mut handle = EngineHandle {
            cancel: cancel.clone(),
            metrics: Arc::clone(&metrics),
            clock,
            stage,
            assembler,
            reporter: None,
        };
        if let Some(period) = self.config.metrics_log_period() {
            match reporter::spawn(period, Arc::clone(&metrics), cancel.clone()) {
                Ok(reporter) => handle.reporter = Some(reporter),
                Err(err) => {
                    handle.abandon();
                    return Err(EngineError::Spawn("metrics-reporter", err));
                }
            }
        }

        info!(
            "engine started: {}x{} at {} ticks/s",
            self.config.width, self.config.height, self.config.tick_rate
        );
        Ok((
            handle,
            DisplaySurface {
                reader,
                cancel,
                metrics,
            },
        ))
    }

    /// Runs the pipeline with `display` as the presentation loop on the
    /// calling thread.
    ///
    /// Blocks until `display` returns, then stops and joins every pipeline
    /// thread. A callback error takes precedence over a display error.
    pub fn run<Ev, D>(self, events: Receiver<Ev>, display: D) -> EngineResult<(), U::Error>
    where
        Ev: Send + 'static,
        S: Send + 'static,
        U: Update<Ev, S> + Send + 'static,
        U::Error: Send + 'static,
        R: Render<U::Render, Error = U::Error> + Send + 'static,
        D: FnOnce(&mut DisplaySurface) -> Result<(), U::Error>,
    {
        let (handle, mut surface) = self.spawn(events)?;
        let shown = display(&mut surface);
        drop(surface);

        match (handle.stop(), shown) {
            (Err(err), _) => Err(err),
            (Ok(_), Err(err)) => Err(EngineError::Display(err)),
            (Ok(_), Ok(())) => Ok(()),
        }
    }
}

/// Control handle over a spawned engine.
pub struct EngineHandle<S, E> {
    cancel: CancelToken,
    metrics: Arc<PipelineMetrics>,
    clock: ClockStop,
    stage: JoinHandle<StageResult<S, E>>,
    assembler: AssemblerHandle,
    reporter: Option<JoinHandle<()>>,
}

impl<S, E> EngineHandle<S, E> {
    /// Token that stops the whole pipeline when cancelled.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Phase timings shared with the pipeline threads.
    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    /// Returns `true` once the pipeline stage has exited.
    pub fn is_finished(&self) -> bool {
        self.stage.is_finished()
    }

    /// Cancels the pipeline and waits for it.
    pub fn stop(self) -> EngineResult<S, E> {
        self.cancel.cancel();
        self.wait()
    }

    /// Waits for the pipeline stage to exit, then shuts down and joins the
    /// remaining threads.
    ///
    /// Returns the final simulation state, or the callback error that
    /// stopped the stage.
    pub fn wait(self) -> EngineResult<S, E> {
        let EngineHandle {
            cancel,
            metrics,
            clock,
            stage,
            assembler,
            reporter,
        } = self;

        let outcome = stage.join();
        cancel.cancel();
        clock.stop();
        let assembled = assembler.join();
        if let Some(reporter) = reporter {
            if reporter.join().is_err() {
                warn!("metrics reporter panicked");
            }
        }

        if let Ok(stats) = &assembled {
            debug!(
                "assembled {} frames carrying {} events; {} ticks superseded",
                stats.frames, stats.events, stats.superseded_ticks
            );
        }
        info!("engine stopped: {}", metrics.snapshot());

        match outcome {
            Err(_) => Err(EngineError::Panicked("pipeline-stage")),
            Ok(Err(err)) => {
                warn!("engine stopped by callback failure");
                Err(EngineError::Callback(err))
            }
            Ok(Ok(_)) if assembled.is_err() => Err(EngineError::Panicked("frame-assembler")),
            Ok(Ok(state)) => Ok(state),
        }
    }
}

impl<S, E> EngineHandle<S, E> {
    /// Stops an engine whose startup is being rolled back.
    ///
    /// Returns `false` and logs the failure when the partial run had already
    /// stopped on an error, since the caller reports the startup error
    /// instead.
    fn abandon(self) -> bool {
        match self.stop() {
            Ok(_) => true,
            Err(EngineError::Callback(StageError::Update(_))) => {
                warn!("update callback failed before startup was rolled back");
                false
            }
            Err(EngineError::Callback(StageError::Render(_))) => {
                warn!("render callback failed before startup was rolled back");
                false
            }
            Err(EngineError::Panicked(thread)) => {
                warn!("{thread} thread panicked before startup was rolled back");
                false
            }
            Err(_) => {
                warn!("engine failed before startup was rolled back");
                false
            }
        }
    }
}

/// Reader side of the engine's framebuffer, owned by the display loop.
pub struct DisplaySurface {
    reader: FrontReader,
    cancel: CancelToken,
    metrics: Arc<PipelineMetrics>,
}

impl DisplaySurface {
    /// Newest complete frame and whether it changed since the last read.
    pub fn read(&mut self) -> (&PixelBuffer, bool) {
        self.reader.read()
    }

    /// Reads the newest frame and passes it to `paint`, timing the call under
    /// [`Phase::Draw`] when the frame changed.
    pub fn present<T>(&mut self, paint: impl FnOnce(&PixelBuffer, bool) -> T) -> T {
        let started = Instant::now();
        let (buffer, changed) = self.reader.read();
        let out = paint(buffer, changed);
        if changed {
            self.metrics.record(Phase::Draw, started.elapsed());
        }
        out
    }

    /// Number of frames swapped to the front so far.
    pub fn generation(&self) -> u64 {
        self.reader.generation()
    }

    /// `false` once the engine was cancelled or the pipeline stopped
    /// publishing.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.reader.is_closed()
    }

    /// Requests shutdown of the pipeline.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Token shared with the pipeline threads.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Phase timings, including the draws recorded by [`Self::present`].
    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }
}
