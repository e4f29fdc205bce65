use std::io;
use std::mem;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, never, select, Receiver, Sender};
use log::{debug, trace};
use tick_clock::Tick;

use crate::{EventBatch, Frame};

/// Binds an event stream to a tick stream, one [`Frame`] per delivered tick.
///
/// The assembler never blocks its event source: while it waits for the
/// downstream consumer it keeps appending events to the open batch, and a
/// newer tick replaces the undelivered one.
pub struct FrameAssembler;

impl FrameAssembler {
    /// Starts the assembler thread.
    ///
    /// The returned receiver is a rendezvous channel and disconnects once the
    /// tick source closes or the consumer drops its end. A closed event source
    /// is tolerated: frames keep coming with empty batches.
    pub fn spawn<E>(
        ticks: Receiver<Tick>,
        events: Receiver<E>,
    ) -> io::Result<(Receiver<Frame<E>>, AssemblerHandle)>
    where
        E: Send + 'static,
    {
        let (tx, rx) = bounded(0);
        let handle = thread::Builder::new()
            .name("frame-assembler".into())
            .spawn(move || assemble(ticks, events, tx))?;
        Ok((rx, AssemblerHandle { handle }))
    }
}

/// Counters reported by an assembler thread when it exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Frames handed downstream.
    pub frames: u64,
    /// Events delivered inside those frames.
    pub events: u64,
    /// Ticks replaced by a newer tick before delivery.
    pub superseded_ticks: u64,
}

/// Join handle of an assembler thread.
pub struct AssemblerHandle {
    handle: JoinHandle<AssemblerStats>,
}

impl AssemblerHandle {
    /// Returns `true` once the thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the thread and returns its counters.
    pub fn join(self) -> thread::Result<AssemblerStats> {
        self.handle.join()
    }
}

enum Step<E> {
    Tick(Tick),
    Event(E),
    EventsClosed,
    TicksClosed,
    Delivered,
    ConsumerGone,
}

fn assemble<E>(ticks: Receiver<Tick>, events: Receiver<E>, out: Sender<Frame<E>>) -> AssemblerStats {
    let closed = never();
    let mut events_open = true;
    let mut batch = EventBatch::new();
    let mut pending: Option<Tick> = None;
    let mut stats = AssemblerStats::default();

    loop {
        let source = if events_open { &events } else { &closed };
        let queued = batch.len() as u64;
        let step = match pending {
            None => select! {
                recv(ticks) -> tick => tick.map_or(Step::TicksClosed, Step::Tick),
                recv(source) -> event => event.map_or(Step::EventsClosed, Step::Event),
            },
            Some(tick) => select! {
                send(out, Frame::new(tick, mem::take(&mut batch))) -> res => match res {
                    Ok(()) => Step::Delivered,
                    Err(_) => Step::ConsumerGone,
                },
                recv(ticks) -> tick => tick.map_or(Step::TicksClosed, Step::Tick),
                recv(source) -> event => event.map_or(Step::EventsClosed, Step::Event),
            },
        };

        match step {
            Step::Tick(tick) => {
                if let Some(stale) = pending.replace(tick) {
                    trace!("tick {} superseded by {}", stale.index(), tick.index());
                    stats.superseded_ticks += 1;
                }
            }
            Step::Event(event) => batch.push(event),
            Step::EventsClosed => {
                debug!("event source closed; continuing with empty batches");
                events_open = false;
            }
            Step::Delivered => {
                stats.frames += 1;
                stats.events += queued;
                pending = None;
            }
            Step::TicksClosed | Step::ConsumerGone => break,
        }
    }

    debug!(
        "frame assembler stopped: frames={} superseded_ticks={}",
        stats.frames, stats.superseded_ticks
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn ticks(n: usize) -> Vec<Tick> {
        let start = Instant::now();
        let mut tick = Tick::origin(start);
        (1..=n)
            .map(|i| {
                tick = tick.step(start + Duration::from_millis(i as u64));
                tick
            })
            .collect()
    }

    #[test]
    fn events_before_tick_form_one_frame() {
        let (tick_tx, tick_rx) = bounded(0);
        let (event_tx, event_rx) = bounded(0);
        let (frames, handle) = FrameAssembler::spawn(tick_rx, event_rx).expect("spawn");
        let steps = ticks(2);
        let (t1, t2) = (steps[0], steps[1]);

        event_tx.send('a').expect("event");
        event_tx.send('b').expect("event");
        tick_tx.send(t1).expect("tick");
        let frame = frames.recv().expect("frame");
        assert_eq!(frame.tick(), &t1);
        assert_eq!(frame.events(), &['a', 'b']);

        tick_tx.send(t2).expect("tick");
        let frame = frames.recv().expect("frame");
        assert_eq!(frame.tick(), &t2);
        assert!(frame.events().is_empty());

        drop(tick_tx);
        let stats = handle.join().expect("join");
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.events, 2);
    }

    #[test]
    fn events_keep_flowing_while_frame_is_undelivered() {
        let (tick_tx, tick_rx) = bounded(0);
        let (event_tx, event_rx) = bounded(0);
        let (frames, handle) = FrameAssembler::spawn(tick_rx, event_rx).expect("spawn");
        let t1 = ticks(1)[0];

        tick_tx.send(t1).expect("tick");
        for i in 0..5 {
            event_tx.send(i).expect("event");
        }
        let frame = frames.recv().expect("frame");
        assert_eq!(frame.tick(), &t1);
        assert_eq!(frame.into_events().into_vec(), vec![0, 1, 2, 3, 4]);

        drop(tick_tx);
        handle.join().expect("join");
    }

    #[test]
    fn newer_tick_supersedes_undelivered_one() {
        let (tick_tx, tick_rx) = bounded(0);
        let (_event_tx, event_rx) = bounded::<u8>(0);
        let (frames, handle) = FrameAssembler::spawn(tick_rx, event_rx).expect("spawn");
        let steps = ticks(3);
        let (t1, t2, t3) = (steps[0], steps[1], steps[2]);

        tick_tx.send(t1).expect("tick");
        tick_tx.send(t2).expect("tick");
        tick_tx.send(t3).expect("tick");
        assert_eq!(frames.recv().expect("frame").tick(), &t3);

        drop(tick_tx);
        assert!(frames.recv().is_err());
        let stats = handle.join().expect("join");
        assert_eq!(stats.superseded_ticks, 2);
        assert_eq!(stats.frames, 1);
    }

    #[test]
    fn closed_event_source_yields_empty_batches() {
        let (tick_tx, tick_rx) = bounded(0);
        let (event_tx, event_rx) = bounded::<u8>(0);
        let (frames, handle) = FrameAssembler::spawn(tick_rx, event_rx).expect("spawn");
        drop(event_tx);

        for tick in ticks(3) {
            tick_tx.send(tick).expect("tick");
            let frame = frames.recv().expect("frame");
            assert_eq!(frame.tick(), &tick);
            assert!(frame.events().is_empty());
        }

        drop(tick_tx);
        assert_eq!(handle.join().expect("join").frames, 3);
    }

    #[test]
    fn dropped_consumer_stops_the_assembler() {
        let (tick_tx, tick_rx) = bounded(1);
        let (_event_tx, event_rx) = bounded::<u8>(0);
        let (frames, handle) = FrameAssembler::spawn(tick_rx, event_rx).expect("spawn");
        drop(frames);
        tick_tx.send(ticks(1)[0]).expect("tick");
        assert_eq!(handle.join().expect("join").frames, 0);
    }
}
