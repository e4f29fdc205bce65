#![deny(missing_docs)]
//! Fixed-rate time source for the frame pipeline.
//!
//! * [`Tick`] – immutable `(zero, previous, current)` timestamp triple with a step index.
//! * [`TickClock`] – timer thread that offers one tick per interval, recomputing
//!   against the current time instead of queueing when the consumer lags.
//! * [`CancelToken`] – broadcast cancellation shared by every pipeline thread.
//! * [`ClockError`] – failure surface for starting the timer.

mod cancel;
mod clock;
mod error;
mod tick;

pub use cancel::CancelToken;
pub use clock::{ClockStop, TickClock};
pub use error::{ClockError, ClockResult};
pub use tick::{Fps, Tick};
