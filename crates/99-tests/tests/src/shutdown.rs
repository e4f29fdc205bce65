#![cfg(test)]

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, never};
use engine::{DisplaySurface, Engine, EngineConfig, EngineError, Frame, PixelBuffer, StageError};
use tick_clock::TickClock;

fn config() -> EngineConfig {
    EngineConfig {
        tick_rate: 200.0,
        width: 2,
        height: 2,
        metrics_log_period_ms: Some(10),
    }
}

fn count(_: Frame<u8>, n: u64) -> Result<(u64, u64), String> {
    Ok((n + 1, n + 1))
}

fn ignore(_: &u64, _: &mut PixelBuffer) -> Result<(), String> {
    Ok(())
}

/// An update failure ends the display loop and is what `run` returns.
#[test]
fn update_error_stops_the_display_loop() {
    crate::init_logging();
    let fail_on_fifth = |frame: Frame<u8>, n: u64| -> Result<(u64, u64), String> {
        if n == 4 {
            return Err(format!("failed at tick {}", frame.tick().index()));
        }
        Ok((n + 1, n + 1))
    };
    let engine = Engine::new(config(), 0u64, fail_on_fifth, ignore);

    let started = Instant::now();
    let result = engine.run(never::<u8>(), |surface: &mut DisplaySurface| {
        while surface.is_running() {
            surface.read();
            thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    });

    assert!(started.elapsed() < Duration::from_secs(5));
    match result {
        Err(EngineError::Callback(StageError::Update(msg))) => {
            assert!(msg.starts_with("failed at tick"), "{msg}")
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

/// A render failure is reported as such.
#[test]
fn render_error_is_reported() {
    let broken = |_: &u64, _: &mut PixelBuffer| -> Result<(), String> { Err("no ink".into()) };
    let engine = Engine::new(config(), 0u64, count, broken);
    let (handle, _surface) = engine.spawn(never::<u8>()).expect("spawn");
    match handle.wait() {
        Err(EngineError::Callback(StageError::Render(msg))) => assert_eq!(msg, "no ink"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

/// Dropping the display surface ends the pipeline without an error.
#[test]
fn dropped_surface_is_a_clean_stop() {
    let engine = Engine::new(config(), 0u64, count, ignore);
    let (handle, surface) = engine.spawn(never::<u8>()).expect("spawn");
    drop(surface);

    let state = handle.wait().expect("clean stop");
    assert!(state >= 1);
}

/// Stopping while producers are still sending leaves no thread behind: the
/// event source sees the assembler disconnect.
#[test]
fn stop_disconnects_the_event_source() {
    let (tx, rx) = bounded(0);
    let engine = Engine::new(config(), 0u64, count, ignore);
    let (handle, _surface) = engine.spawn(rx).expect("spawn");

    let producer = thread::spawn(move || {
        let mut sent = 0u32;
        while tx.send(1u8).is_ok() {
            sent += 1;
            thread::sleep(Duration::from_micros(100));
        }
        sent
    });
    thread::sleep(Duration::from_millis(50));
    assert!(!handle.is_finished());
    handle.stop().expect("clean stop");

    let sent = producer.join().expect("producer");
    assert!(sent > 0);
}

/// A stopped clock's stream ends within one interval.
#[test]
fn clock_stream_closes_promptly_after_stop() {
    let interval = Duration::from_millis(20);
    let (ticks, stop) = TickClock::start(interval).expect("clock");
    ticks.recv().expect("tick");

    let started = Instant::now();
    stop.stop();
    assert!(ticks.recv().is_err());
    assert!(started.elapsed() < interval);
}
