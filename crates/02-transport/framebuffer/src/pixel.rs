use crate::{FramebufferError, FramebufferResult};

/// 8-bit RGBA colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 0xFF);
    /// Opaque white.
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF, 0xFF);
    /// Opaque red.
    pub const RED: Self = Self::new(0xFF, 0, 0, 0xFF);

    /// Builds a colour from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packs the colour as little-endian `[r, g, b, a]` bytes.
    pub const fn to_u32(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    /// Inverse of [`Rgba::to_u32`].
    pub const fn from_u32(value: u32) -> Self {
        let [r, g, b, a] = value.to_le_bytes();
        Self { r, g, b, a }
    }
}

/// Axis-aligned rectangle, `min` inclusive and `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    /// Left edge.
    pub min_x: i32,
    /// Top edge.
    pub min_y: i32,
    /// Right edge (exclusive).
    pub max_x: i32,
    /// Bottom edge (exclusive).
    pub max_y: i32,
}

impl Rect {
    /// Creates a rectangle from its corners.
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Square of side `2 * half` centred on `(cx, cy)`.
    pub const fn square(cx: i32, cy: i32, half: i32) -> Self {
        Self::new(cx - half, cy - half, cx + half, cy + half)
    }

    /// Returns `true` when the rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    fn clip(&self, width: u32, height: u32) -> Option<(usize, usize, usize, usize)> {
        let clamp = |v: i32, hi: u32| v.clamp(0, hi.min(i32::MAX as u32) as i32) as usize;
        let x0 = clamp(self.min_x, width);
        let x1 = clamp(self.max_x, width);
        let y0 = clamp(self.min_y, height);
        let y1 = clamp(self.max_y, height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }
}

/// Fixed-size raster in row-major order.
///
/// Dimensions are set at construction and never change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// Allocates a black buffer of `width x height` pixels.
    pub fn new(width: u32, height: u32) -> FramebufferResult<Self> {
        let invalid = FramebufferError::InvalidSize { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(invalid)?;
        Ok(Self {
            width,
            height,
            pixels: vec![Rgba::BLACK; len],
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major pixel storage.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Mutable row-major pixel storage.
    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Writes the pixel at `(x, y)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, colour: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = colour;
        }
    }

    /// Overwrites every pixel.
    pub fn fill(&mut self, colour: Rgba) {
        self.pixels.fill(colour);
    }

    /// Fills the part of `rect` that lies inside the buffer.
    pub fn fill_rect(&mut self, rect: Rect, colour: Rgba) {
        let Some((x0, y0, x1, y1)) = rect.clip(self.width, self.height) else {
            return;
        };
        let stride = self.width as usize;
        for row in self.pixels.chunks_exact_mut(stride).take(y1).skip(y0) {
            row[x0..x1].fill(colour);
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}
