use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

/// Broadcast cancellation signal.
///
/// Cloning yields another handle to the same signal. [`cancel`](Self::cancel)
/// drops the internal sender, so every [`cancelled`](Self::cancelled) receiver
/// observes a disconnect and can be used as a `select!` arm.
#[derive(Clone, Debug)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    flag: AtomicBool,
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
}

impl CancelToken {
    /// Creates a fresh, uncancelled token.
    pub fn new() -> Self {
        let (sender, receiver) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                flag: AtomicBool::new(false),
                sender: Mutex::new(Some(sender)),
                receiver,
            }),
        }
    }

    /// Signals cancellation. Calling this more than once is a no-op.
    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::Release);
        self.inner.sender.lock().take();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::Acquire)
    }

    /// Receiver that disconnects when the token is cancelled.
    ///
    /// Nothing is ever sent on it; `recv` returns `Err` after cancellation.
    pub fn cancelled(&self) -> &Receiver<()> {
        &self.inner.receiver
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
