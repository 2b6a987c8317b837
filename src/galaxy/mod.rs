//! Decorative spiral-galaxy particle field.
//!
//! A fixed population of particles is scattered along logarithmic spiral
//! arms once, then repainted every display frame with inner particles
//! rotating faster than outer ones. The host supplies the drawing surface,
//! the frame scheduler and resize notifications; see [`host`].
//!
//! The whole thing is decoration: a host without a drawing surface gets a
//! renderer that never exists rather than an error.

pub mod host;
mod particle;
mod raster;
mod renderer;

use std::fmt;

pub use host::{FrameHandle, FrameScheduler, ResizeObserver, Surface};
pub use particle::{GalaxyParams, Particle, generate_particles};
pub use raster::{PixelSurface, TickScheduler};
pub use renderer::GalaxyRenderer;

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Straight (non-premultiplied) colour with alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_display() {
        assert_eq!(Rgba::rgb(0xfd, 0xe0, 0x47).to_string(), "#fde047");
        assert_eq!(
            Rgba::rgb(253, 224, 71).with_alpha(0.3).to_string(),
            "rgba(253, 224, 71, 0.3)"
        );
    }
}
