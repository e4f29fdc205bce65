//! Bouncing-squares simulation driven by the engine's update callback.

use std::convert::Infallible;
use std::f64::consts::TAU;

use engine::{Frame, PixelBuffer, Rect, Rgba};
use rand::Rng;

/// Pixels per second travelled by every square.
pub const SPEED: f64 = 250.0;
/// Half the side length of a square, in pixels.
pub const HALF_SIZE: f64 = 2.0;

/// Input delivered to the simulation between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemoEvent {
    TogglePause,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Square {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

/// Simulation state folded across ticks.
#[derive(Clone, Debug)]
pub struct Squares {
    squares: Vec<Square>,
    width: f64,
    height: f64,
    paused: bool,
    steps: u64,
    toggles: u64,
}

/// Rectangles to draw for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene(pub Vec<Rect>);

impl Squares {
    /// Scatters `count` squares with random headings over a `width x height`
    /// field.
    pub fn random(count: usize, width: u32, height: u32, rng: &mut impl Rng) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        let squares = (0..count)
            .map(|_| {
                let theta = rng.gen_range(0.0..TAU);
                Square {
                    x: rng.gen_range(HALF_SIZE..=(w - HALF_SIZE).max(HALF_SIZE)),
                    y: rng.gen_range(HALF_SIZE..=(h - HALF_SIZE).max(HALF_SIZE)),
                    vx: theta.cos(),
                    vy: theta.sin(),
                }
            })
            .collect();
        Self {
            squares,
            width: w,
            height: h,
            paused: false,
            steps: 0,
            toggles: 0,
        }
    }

    /// Number of ticks that moved the squares.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Number of pause toggles received.
    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Applies the frame's events, then moves every square
    /// by `SPEED * delta`, reflecting off the field edges.
    pub fn step(mut self, frame: Frame<DemoEvent>) -> Result<(Self, Scene), Infallible> {
        for event in frame.events() {
            match event {
                DemoEvent::TogglePause => {
                    self.paused = !self.paused;
                    self.toggles += 1;
                }
            }
        }

        if !self.paused {
            let distance = SPEED * frame.tick().delta().as_secs_f64();
            for square in &mut self.squares {
                square.advance(distance, self.width, self.height);
            }
            self.steps += 1;
        }

        let scene = Scene(self.squares.iter().map(Square::rect).collect());
        Ok((self, scene))
    }
}

impl Square {
    fn advance(&mut self, distance: f64, width: f64, height: f64) {
        self.x += self.vx * distance;
        self.y += self.vy * distance;
        if self.x - HALF_SIZE < 0.0 {
            self.vx = self.vx.abs();
        }
        if self.y - HALF_SIZE < 0.0 {
            self.vy = self.vy.abs();
        }
        if self.x + HALF_SIZE > width {
            self.vx = -self.vx.abs();
        }
        if self.y + HALF_SIZE > height {
            self.vy = -self.vy.abs();
        }
    }

    fn rect(&self) -> Rect {
        Rect::square(self.x.round() as i32, self.y.round() as i32, HALF_SIZE as i32)
    }
}

/// Update callback handed to the engine.
pub fn update(frame: Frame<DemoEvent>, state: Squares) -> Result<(Squares, Scene), Infallible> {
    state.step(frame)
}

/// Render callback: red squares on black.
pub fn paint(scene: &Scene, buffer: &mut PixelBuffer) -> Result<(), Infallible> {
    buffer.fill(Rgba::BLACK);
    for rect in &scene.0 {
        buffer.fill_rect(*rect, Rgba::RED);
    }
    Ok(())
}
