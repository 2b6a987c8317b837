//! Headless host: a software raster surface and a counting scheduler.

use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage};
use log::warn;
use std::path::Path;

use super::host::{FrameHandle, FrameScheduler, Surface};
use super::{Point, Rgba};

/// Largest backing store, in device pixels, a resize will allocate.
pub const MAX_PIXELS: usize = 1 << 25;

/// RGBA software surface with a device-pixel backing store.
///
/// Pixels hold straight colour channels in `0.0..=1.0` and are composited
/// source-over, like a 2D canvas.
#[derive(Debug, Clone, Default)]
pub struct PixelSurface {
    scale: f64,
    pixel_width: usize,
    pixel_height: usize,
    pixels: Vec<[f32; 4]>,
}

impl PixelSurface {
    /// An empty surface; it has no pixels until the first resize.
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            ..Default::default()
        }
    }

    /// Backing store size in device pixels.
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.pixel_width, self.pixel_height)
    }

    /// Colour and alpha at a device pixel.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[f32; 4]> {
        (x < self.pixel_width && y < self.pixel_height)
            .then(|| self.pixels[y * self.pixel_width + x])
    }

    /// Flatten the surface over `background` into an 8-bit RGB image.
    pub fn to_rgb_image(&self, background: Rgba) -> Result<RgbImage> {
        let width = u32::try_from(self.pixel_width).context("Surface too wide")?;
        let height = u32::try_from(self.pixel_height).context("Surface too tall")?;
        let [br, bg, bb] = [background.r, background.g, background.b].map(|c| f32::from(c) / 255.0);

        Ok(RgbImage::from_fn(width, height, |x, y| {
            let [r, g, b, a] = self.pixels[y as usize * self.pixel_width + x as usize];
            let over = |c: f32, back: f32| ((c * a + back * (1.0 - a)).clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb([over(r, br), over(g, bg), over(b, bb)])
        }))
    }

    /// Save the surface as a PNG, composited over `background`.
    pub fn save_png(&self, path: &Path, background: Rgba) -> Result<()> {
        self.to_rgb_image(background)?
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    fn blend(&mut self, x: usize, y: usize, color: Rgba, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b].map(|c| f32::from(c) / 255.0);
        let dst = &mut self.pixels[y * self.pixel_width + x];

        let out_a = alpha + dst[3] * (1.0 - alpha);
        if out_a > 0.0 {
            for i in 0..3 {
                dst[i] = (src[i] * alpha + dst[i] * dst[3] * (1.0 - alpha)) / out_a;
            }
        }
        dst[3] = out_a;
    }

    /// Device-pixel bounding box of a circle, clipped to the surface.
    fn device_bounds(&self, center: Point, radius: f64) -> Option<(usize, usize, usize, usize)> {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return None;
        }
        let cx = center.x * self.scale;
        let cy = center.y * self.scale;
        let r = radius * self.scale;

        let x0 = (cx - r).floor().max(0.0) as usize;
        let y0 = (cy - r).floor().max(0.0) as usize;
        let x1 = ((cx + r).ceil().max(0.0) as usize).min(self.pixel_width - 1);
        let y1 = ((cy + r).ceil().max(0.0) as usize).min(self.pixel_height - 1);

        (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1))
    }
}

impl Surface for PixelSurface {
    fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
        let device = |css: f64| {
            let px = css * device_pixel_ratio;
            px.is_finite().then(|| px.max(0.0) as usize)
        };
        let size = device(width)
            .zip(device(height))
            .filter(|(w, h)| w.checked_mul(*h).is_some_and(|n| n <= MAX_PIXELS));

        let (pixel_width, pixel_height) = size.unwrap_or_else(|| {
            warn!(
                "Surface of {}x{} at ratio {} is out of range, leaving it empty",
                width, height, device_pixel_ratio
            );
            (0, 0)
        });

        self.scale = if device_pixel_ratio.is_finite() { device_pixel_ratio } else { 1.0 };
        self.pixel_width = pixel_width;
        self.pixel_height = pixel_height;
        // Resizing a canvas discards its contents
        self.pixels = vec![[0.0; 4]; pixel_width * pixel_height];
    }

    fn clear(&mut self) {
        self.pixels.fill([0.0; 4]);
    }

    fn fill_radial_glow(&mut self, center: Point, radius: f64, color: Rgba) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(center, radius) else {
            return;
        };
        let r = radius * self.scale;
        if r <= 0.0 {
            return;
        }

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x * self.scale;
                let dy = y as f64 + 0.5 - center.y * self.scale;
                let t = (dx * dx + dy * dy).sqrt() / r;
                if t < 1.0 {
                    self.blend(x, y, color, (color.a * (1.0 - t)) as f32);
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba, alpha: f64) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(center, radius) else {
            return;
        };
        let r = radius * self.scale;
        let alpha = alpha * color.a;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x * self.scale;
                let dy = y as f64 + 0.5 - center.y * self.scale;
                // Cheap edge anti-aliasing: one pixel wide ramp
                let coverage = (r - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
                self.blend(x, y, color, (alpha * coverage) as f32);
            }
        }
    }
}

/// Scheduler for hosts that drive frames themselves.
///
/// Hands out increasing handles and counts requests and cancellations.
#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    next: u64,
    cancelled: usize,
}

impl TickScheduler {
    /// Number of frames requested so far.
    pub fn requested(&self) -> u64 {
        self.next
    }

    /// Number of cancellations received.
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for TickScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        FrameHandle(self.next)
    }

    fn cancel_frame(&mut self, _handle: FrameHandle) {
        self.cancelled += 1;
    }
}
