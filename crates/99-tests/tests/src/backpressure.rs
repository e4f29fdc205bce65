#![cfg(test)]

use std::convert::Infallible;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::never;
use engine::{Engine, EngineConfig, Frame, PixelBuffer, Rgba};
use parking_lot::Mutex;

fn config(tick_rate: f64) -> EngineConfig {
    EngineConfig {
        tick_rate,
        width: 16,
        height: 16,
        metrics_log_period_ms: None,
    }
}

fn count(_: Frame<()>, n: u32) -> Result<(u32, u32), Infallible> {
    Ok((n + 1, n + 1))
}

fn fill_counter(n: &u32, buf: &mut PixelBuffer) -> Result<(), Infallible> {
    buf.fill(Rgba::from_u32(*n));
    Ok(())
}

/// Every read shows one whole frame and frames only move forward.
fn assert_whole_and_monotonic(reads: &[(u32, bool)]) {
    let mut last = 0;
    for &(value, changed) in reads {
        if changed {
            assert!(value > last, "published {value} after {last}");
        } else {
            assert_eq!(value, last, "unchanged read moved from {last} to {value}");
        }
        last = value;
    }
}

/// A display slower than the tick rate sees the newest state on each refresh
/// instead of a backlog, and the stage reports the frames it skipped drawing.
#[test]
fn slow_display_sees_freshest_frames() {
    crate::init_logging();
    let engine = Engine::new(config(200.0), 0u32, count, fill_counter);
    let (handle, mut surface) = engine.spawn(never::<()>()).expect("spawn");

    let mut reads = Vec::new();
    let deadline = Instant::now() + Duration::from_millis(400);
    while Instant::now() < deadline {
        let (buf, changed) = surface.read();
        let value = buf.pixels()[0].to_u32();
        let whole = buf.pixels().iter().all(|p| p.to_u32() == value);
        if surface.generation() > 0 {
            assert!(whole, "torn frame");
            reads.push((value, changed));
        }
        thread::sleep(Duration::from_millis(30));
    }
    let metrics = Arc::clone(handle.metrics());
    let state = handle.stop().expect("clean stop");

    assert_whole_and_monotonic(&reads);
    let changed: Vec<u32> = reads.iter().filter(|r| r.1).map(|r| r.0).collect();
    assert!(changed.len() >= 3, "too few frames: {changed:?}");
    assert!(
        changed.windows(2).any(|w| w[1] - w[0] > 1),
        "display saw every frame despite lagging: {changed:?}"
    );

    let snap = metrics.snapshot();
    assert!(snap.superseded_frames > 0);
    assert!(snap.deferred_renders > 0);
    assert!(u64::from(state) > snap.phase(engine::Phase::Render).count);
}

/// A render slower than the tick rate never exposes a half-drawn buffer, and
/// every value shown was fully rendered first.
#[test]
fn slow_render_never_tears() {
    crate::init_logging();
    let rendered = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&rendered);
    let slow_fill = move |n: &u32, buf: &mut PixelBuffer| -> Result<(), Infallible> {
        let (w, h) = (buf.width(), buf.height());
        for y in 0..h {
            for x in 0..w {
                buf.set(x, y, Rgba::from_u32(*n));
            }
            thread::sleep(Duration::from_micros(500));
        }
        log.lock().push(*n);
        Ok(())
    };
    let engine = Engine::new(config(250.0), 0u32, count, slow_fill);
    let (handle, mut surface) = engine.spawn(never::<()>()).expect("spawn");

    let mut reads = Vec::new();
    let deadline = Instant::now() + Duration::from_millis(300);
    while Instant::now() < deadline {
        let (buf, changed) = surface.read();
        let value = buf.pixels()[0].to_u32();
        let whole = buf.pixels().iter().all(|p| p.to_u32() == value);
        if surface.generation() > 0 {
            assert!(whole, "torn frame");
            reads.push((value, changed));
        }
        thread::sleep(Duration::from_micros(200));
    }
    handle.stop().expect("clean stop");

    assert_whole_and_monotonic(&reads);
    let rendered = rendered.lock();
    assert!(reads.iter().all(|(value, _)| rendered.contains(value)));
}
