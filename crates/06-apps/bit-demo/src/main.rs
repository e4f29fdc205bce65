//! Headless bouncing-squares demo running on the frame pipeline.

mod sim;

use std::fs;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossbeam_channel::{bounded, select, tick, Sender};
use engine::{CancelToken, Engine, EngineConfig, Fps, Phase, Rgba};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use sim::{DemoEvent, Squares};

/// Bouncing red squares, simulated and rendered off-screen.
#[derive(Parser, Debug)]
#[command(author, version, about = "Run the frame pipeline headless", long_about = None)]
struct Cli {
    /// TOML file with engine settings; flags override it.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Simulation ticks per second.
    #[arg(long)]
    tick_rate: Option<f64>,

    /// Framebuffer width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Framebuffer height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Number of squares.
    #[arg(long, default_value_t = 1_000)]
    squares: usize,

    /// How long to run before stopping.
    #[arg(long, default_value_t = 3_000)]
    duration_ms: u64,

    /// Display refresh rate of the headless presentation loop.
    #[arg(long, default_value_t = 60.0)]
    refresh_hz: f64,

    /// Period of the metrics log line.
    #[arg(long)]
    metrics_ms: Option<u64>,

    /// Interval between simulated pause toggles; 0 disables them.
    #[arg(long, default_value_t = 1_000)]
    pause_every_ms: u64,

    /// Seed for the initial square layout.
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {path:?}"))?;
                toml::from_str(&text).with_context(|| format!("failed to parse config {path:?}"))?
            }
            None => EngineConfig::default(),
        };
        if let Some(rate) = self.tick_rate {
            config.tick_rate = rate;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.metrics_ms.is_some() {
            config.metrics_log_period_ms = self.metrics_ms;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Default)]
struct Presented {
    refreshes: u64,
    changed: u64,
    lit_pixels: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = cli.engine_config()?;
    let refresh = Fps(cli.refresh_hz)
        .interval()
        .ok_or_else(|| anyhow!("refresh rate must be positive, got {}", cli.refresh_hz))?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let initial = Squares::random(cli.squares, config.width, config.height, &mut rng);

    let (events_tx, events_rx) = bounded(16);
    let engine = Engine::new(config, initial, sim::update, sim::paint);
    let (handle, mut surface) = engine.spawn(events_rx)?;
    let input = spawn_input(
        Duration::from_millis(cli.pause_every_ms),
        events_tx,
        handle.cancel_token().clone(),
    )?;

    let deadline = Instant::now() + Duration::from_millis(cli.duration_ms);
    let refresh = tick(refresh);
    let mut presented = Presented::default();
    while surface.is_running() && Instant::now() < deadline {
        let _ = refresh.recv();
        presented.refreshes += 1;
        surface.present(|buffer, changed| {
            if changed {
                presented.changed += 1;
                presented.lit_pixels = buffer.pixels().iter().filter(|p| **p == Rgba::RED).count();
            }
        });
    }

    let metrics = std::sync::Arc::clone(handle.metrics());
    let state = handle.stop()?;
    if let Some(input) = input {
        input
            .join()
            .map_err(|_| anyhow!("input thread panicked"))?;
    }

    let snapshot = metrics.snapshot();
    println!(
        "steps={} toggles={} paused={}",
        state.steps(),
        state.toggles(),
        state.is_paused()
    );
    println!(
        "refreshes={} changed={} lit_pixels={}",
        presented.refreshes, presented.changed, presented.lit_pixels
    );
    for phase in Phase::ALL {
        let metric = snapshot.phase(phase);
        let rate = metric
            .average_rate()
            .map_or_else(|| "no data".to_string(), |rate| format!("{rate:.1}/s"));
        println!("{:>6}: {metric} ({rate})", phase.as_str());
    }
    println!(
        "deferred renders={} superseded frames={}",
        snapshot.deferred_renders, snapshot.superseded_frames
    );
    Ok(())
}

/// Simulated keyboard: toggles pause every `period` until `cancel` fires.
fn spawn_input(
    period: Duration,
    events: Sender<DemoEvent>,
    cancel: CancelToken,
) -> Result<Option<JoinHandle<()>>> {
    if period.is_zero() {
        return Ok(None);
    }
    let handle = thread::Builder::new()
        .name("demo-input".into())
        .spawn(move || loop {
            let stopped = select! {
                recv(cancel.cancelled()) -> _ => true,
                default(period) => false,
            };
            if stopped || events.send(DemoEvent::TogglePause).is_err() {
                debug!("input generator stopped");
                return;
            }
            info!("pause toggled");
        })
        .context("failed to spawn input thread")?;
    Ok(Some(handle))
}
