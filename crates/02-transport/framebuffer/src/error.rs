use thiserror::Error;

/// Convenience result alias for framebuffer operations.
pub type FramebufferResult<T> = Result<T, FramebufferError>;

/// Errors surfaced by pixel buffers and the double-buffer hand-off.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferError {
    /// Dimensions were zero or the pixel count overflowed.
    #[error("invalid framebuffer size {width}x{height}")]
    InvalidSize {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The other side of the hand-off has been dropped.
    #[error("framebuffer peer closed")]
    Closed,
}
