use std::mem;
use std::ops::{Deref, DerefMut};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use log::debug;

use crate::{FramebufferError, FramebufferResult, PixelBuffer};

/// Allocates the two buffers of a `width x height` pair and returns its
/// writer and reader halves.
///
/// Both hand-off channels hold at most one buffer, so the writer can be at
/// most one published frame ahead of the reader.
pub fn double_buffer(width: u32, height: u32) -> FramebufferResult<(BackWriter, FrontReader)> {
    let front = PixelBuffer::new(width, height)?;
    let back = PixelBuffer::new(width, height)?;

    let (free_tx, free_rx) = bounded(1);
    let (ready_tx, ready_rx) = bounded(1);
    free_tx
        .try_send(BackBuffer(back))
        .map_err(|_| FramebufferError::Closed)?;

    Ok((
        BackWriter {
            free: free_rx,
            ready: ready_tx,
        },
        FrontReader {
            front,
            generation: 0,
            ready: ready_rx,
            free: free_tx,
            closed: false,
        },
    ))
}

/// Back buffer exclusively held by the writer until published.
#[derive(Debug)]
pub struct BackBuffer(PixelBuffer);

impl Deref for BackBuffer {
    type Target = PixelBuffer;

    fn deref(&self) -> &PixelBuffer {
        &self.0
    }
}

impl DerefMut for BackBuffer {
    fn deref_mut(&mut self) -> &mut PixelBuffer {
        &mut self.0
    }
}

/// Writer half of a [`double_buffer`] pair.
#[derive(Debug)]
pub struct BackWriter {
    free: Receiver<BackBuffer>,
    ready: Sender<BackBuffer>,
}

impl BackWriter {
    /// Takes the back buffer without blocking.
    ///
    /// Returns `None` while the previously published buffer has not been
    /// swapped to the front by the reader, or once the reader is gone.
    pub fn try_acquire_back(&self) -> Option<BackBuffer> {
        self.free.try_recv().ok()
    }

    /// Channel that yields the back buffer once the reader frees it.
    ///
    /// Suitable as a `select!` arm; it disconnects when the reader is dropped.
    pub fn back_ready(&self) -> &Receiver<BackBuffer> {
        &self.free
    }

    /// Hands a fully drawn buffer to the reader.
    ///
    /// Never blocks: the writer only holds a buffer after the reader consumed
    /// the previous publish. Fails with [`FramebufferError::Closed`] when the
    /// reader has been dropped.
    pub fn publish(&self, buffer: BackBuffer) -> FramebufferResult<()> {
        self.ready
            .try_send(buffer)
            .map_err(|_| FramebufferError::Closed)
    }
}

/// Reader half of a [`double_buffer`] pair.
#[derive(Debug)]
pub struct FrontReader {
    front: PixelBuffer,
    generation: u64,
    ready: Receiver<BackBuffer>,
    free: Sender<BackBuffer>,
    closed: bool,
}

impl FrontReader {
    /// Returns the newest complete buffer and whether it changed since the
    /// previous call. Never blocks.
    pub fn read(&mut self) -> (&PixelBuffer, bool) {
        match self.ready.try_recv() {
            Ok(BackBuffer(fresh)) => {
                let stale = mem::replace(&mut self.front, fresh);
                self.generation += 1;
                // Fails only when the writer is gone, in which case the
                // buffer is no longer needed.
                let _ = self.free.try_send(BackBuffer(stale));
                (&self.front, true)
            }
            Err(TryRecvError::Empty) => (&self.front, false),
            Err(TryRecvError::Disconnected) => {
                if !self.closed {
                    debug!("framebuffer writer closed after {} frames", self.generation);
                    self.closed = true;
                }
                (&self.front, false)
            }
        }
    }

    /// Current front buffer, without checking for a newer publish.
    pub fn front(&self) -> &PixelBuffer {
        &self.front
    }

    /// Number of published buffers swapped to the front so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` once a read has observed that the writer was dropped
    /// and every published buffer has been consumed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
