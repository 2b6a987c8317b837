//! Seams between the renderer and the UI runtime hosting it.
//!
//! A browser host maps these onto a 2D canvas context,
//! `requestAnimationFrame` and a `ResizeObserver`; the headless types in
//! this crate implement them for tests and the CLI.

use super::{Point, Rgba};

/// Identifies one scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Schedules repaints on the host's display refresh.
///
/// When a requested frame comes due the host calls
/// [`GalaxyRenderer::on_frame`](super::GalaxyRenderer::on_frame) with the
/// handle returned here.
#[cfg_attr(test, mockall::automock)]
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;

    /// The frame must not be delivered afterwards.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Subscription delivering container size changes to the renderer.
#[cfg_attr(test, mockall::automock)]
pub trait ResizeObserver {
    fn disconnect(&mut self);
}

/// 2D drawing surface sized to the renderer's container.
///
/// All coordinates are CSS pixels; the surface maps them onto its backing
/// store using the device pixel ratio given to [`Surface::resize`].
#[cfg_attr(test, mockall::automock)]
pub trait Surface {
    /// Resize the backing store to `width * device_pixel_ratio` by
    /// `height * device_pixel_ratio` device pixels.
    fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64);

    fn clear(&mut self);

    /// Radial gradient from `color` at `center` to fully transparent at `radius`.
    fn fill_radial_glow(&mut self, center: Point, radius: f64, color: Rgba);

    /// Filled disc drawn with `color` at opacity `alpha`.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba, alpha: f64);
}
