use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick as ticker, Receiver, Sender};
use log::{debug, trace, warn};

use crate::{CancelToken, ClockError, ClockResult, Tick};

/// Fixed-interval tick source running on its own thread.
///
/// The output channel is a rendezvous channel: at most one tick is ever on
/// offer. When the timer fires while a tick is still unclaimed, the offer is
/// replaced by a tick recomputed against the current time, so a consumer that
/// stalls sees one large `delta` instead of a backlog.
pub struct TickClock;

impl TickClock {
    /// Starts a clock with its own cancellation token.
    pub fn start(interval: Duration) -> ClockResult<(Receiver<Tick>, ClockStop)> {
        Self::start_with_cancel(interval, CancelToken::new())
    }

    /// Starts a clock that also stops when `cancel` fires.
    ///
    /// The returned receiver disconnects once the clock thread has exited.
    pub fn start_with_cancel(
        interval: Duration,
        cancel: CancelToken,
    ) -> ClockResult<(Receiver<Tick>, ClockStop)> {
        if interval.is_zero() {
            return Err(ClockError::ZeroInterval);
        }

        let (tx, rx) = bounded(0);
        let thread_cancel = cancel.clone();
        let handle = thread::Builder::new()
            .name("tick-clock".into())
            .spawn(move || run_clock(interval, tx, thread_cancel))?;
        debug!("tick clock started: interval={interval:?}");

        Ok((
            rx,
            ClockStop {
                cancel,
                handle: Some(handle),
            },
        ))
    }
}

fn run_clock(interval: Duration, out: Sender<Tick>, cancel: CancelToken) {
    let timer = ticker(interval);

    let mut prev = select! {
        recv(cancel.cancelled()) -> _ => return,
        recv(timer) -> _ => Tick::origin(Instant::now()),
    };

    loop {
        let fired = select! {
            recv(cancel.cancelled()) -> _ => false,
            recv(timer) -> _ => true,
        };
        if !fired {
            break;
        }

        let mut next = prev.step(Instant::now());
        let offer = loop {
            let offer = select! {
                recv(cancel.cancelled()) -> _ => Offer::Cancelled,
                send(out, next) -> res => match res {
                    Ok(()) => Offer::Delivered,
                    Err(_) => Offer::Disconnected,
                },
                recv(timer) -> _ => Offer::Expired,
            };
            if !matches!(offer, Offer::Expired) {
                break offer;
            }
            trace!("tick {} unclaimed; recomputing", next.index());
            next = prev.step(Instant::now());
        };

        match offer {
            Offer::Delivered => prev = next,
            Offer::Disconnected => {
                debug!("tick consumer disconnected");
                break;
            }
            Offer::Cancelled | Offer::Expired => break,
        }
    }
    debug!("tick clock stopped after {} ticks", prev.index());
}

enum Offer {
    Delivered,
    Disconnected,
    Cancelled,
    Expired,
}

/// Stop handle for a running [`TickClock`].
///
/// Dropping the handle stops the clock as well.
pub struct ClockStop {
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
}

impl ClockStop {
    /// Token observed by the clock thread.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Cancels the clock and waits for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("tick clock thread panicked");
            }
        }
    }
}

impl Drop for ClockStop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
