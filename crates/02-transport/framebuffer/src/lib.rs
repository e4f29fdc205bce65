#![deny(missing_docs)]
//! Off-screen rasters and the two-buffer hand-off between the pipeline stage
//! and the presentation loop.
//!
//! Exactly two [`PixelBuffer`]s exist per [`double_buffer`] pair. The writer
//! owns at most one of them at a time (as a [`BackBuffer`]) and hands it over
//! with [`BackWriter::publish`]; the reader swaps it to the front on its next
//! [`FrontReader::read`] and returns the old front to the writer.

mod double;
mod error;
mod pixel;

pub use double::{double_buffer, BackBuffer, BackWriter, FrontReader};
pub use error::{FramebufferError, FramebufferResult};
pub use pixel::{PixelBuffer, Rect, Rgba};
