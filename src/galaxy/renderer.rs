use log::debug;
use rand::Rng;

use super::host::{FrameHandle, FrameScheduler, ResizeObserver, Surface};
use super::particle::{GalaxyParams, Particle, generate_particles};
use super::Point;

/// One mounted particle field.
///
/// Owns its surface, its scheduler and (once attached) its resize observer.
/// Dropping the renderer unmounts it.
pub struct GalaxyRenderer<S: Surface, F: FrameScheduler> {
    surface: S,
    scheduler: F,
    observer: Option<Box<dyn ResizeObserver>>,
    params: GalaxyParams,
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    radii: (f64, f64),
    pending: Option<FrameHandle>,
    mounted: bool,
}

impl<S: Surface, F: FrameScheduler> GalaxyRenderer<S, F> {
    /// Create the particle population and take ownership of the host seams.
    ///
    /// Returns `None` when the host has no drawing surface; nothing is
    /// scheduled in that case.
    pub fn mount<R: Rng + ?Sized>(
        surface: Option<S>,
        scheduler: F,
        params: GalaxyParams,
        rng: &mut R,
    ) -> Option<Self> {
        let Some(surface) = surface else {
            debug!("No drawing surface available, particle field disabled");
            return None;
        };

        let particles = generate_particles(&params, rng);
        debug!("Mounted particle field with {} particles", particles.len());

        Some(Self {
            surface,
            scheduler,
            observer: None,
            params,
            particles,
            width: 0.0,
            height: 0.0,
            radii: (0.0, 0.0),
            pending: None,
            mounted: true,
        })
    }

    /// Hand over the subscription that feeds [`Self::on_resize`]; it is
    /// disconnected on unmount.
    pub fn observe(&mut self, observer: Box<dyn ResizeObserver>) {
        if let Some(mut previous) = self.observer.replace(observer) {
            previous.disconnect();
        }
    }

    /// React to a new container size in CSS pixels.
    ///
    /// Resizes the backing store, rescales the ellipse and starts the frame
    /// loop if it is not running. Particles are left untouched.
    pub fn on_resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
        if !self.mounted {
            return;
        }

        let width = width.max(0.0);
        let height = height.max(0.0);
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };

        self.surface.resize(width, height, dpr);
        self.width = width;
        self.height = height;
        self.radii = (
            width / 2.0 * self.params.fill_factor,
            height / 2.0 * self.params.fill_factor,
        );

        if self.pending.is_none() {
            self.paint();
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    /// Deliver a due frame: repaint and schedule the next one.
    ///
    /// Handles other than the pending one are stale and ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) {
        if !self.mounted || self.pending != Some(handle) {
            return;
        }

        self.paint();
        self.pending = Some(self.scheduler.request_frame());
    }

    /// Cancel the pending frame and disconnect the resize observer.
    /// Idempotent.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;

        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
        }
        debug!("Unmounted particle field");
    }

    /// False once [`GalaxyRenderer::unmount`] has run.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Handle of the frame the renderer is waiting on, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// The particle set; created at mount and kept across resizes.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Semi-axes of the ellipse the outermost particles travel on.
    pub fn radii(&self) -> (f64, f64) {
        self.radii
    }

    /// The drawing surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    fn paint(&mut self) {
        let center = Point::new(self.width / 2.0, self.height / 2.0);

        self.surface.clear();
        self.surface.fill_radial_glow(
            center,
            self.width * self.params.core_radius_factor,
            self.params.core_color,
        );

        for particle in &mut self.particles {
            particle.advance();

            let p = particle.project(center, self.radii);
            if p.x > 0.0 && p.x < self.width && p.y > 0.0 && p.y < self.height {
                self.surface
                    .fill_circle(p, particle.size, particle.color, particle.opacity);
            }
        }
    }
}

impl<S: Surface, F: FrameScheduler> Drop for GalaxyRenderer<S, F> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::host::{MockFrameScheduler, MockResizeObserver, MockSurface};
    use crate::galaxy::{PixelSurface, TickScheduler};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small_params() -> GalaxyParams {
        GalaxyParams {
            particle_count: 50,
            ..Default::default()
        }
    }

    fn headless(params: GalaxyParams) -> GalaxyRenderer<PixelSurface, TickScheduler> {
        GalaxyRenderer::mount(
            Some(PixelSurface::new()),
            TickScheduler::default(),
            params,
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap()
    }

    fn angles(renderer: &GalaxyRenderer<PixelSurface, TickScheduler>) -> Vec<f64> {
        renderer.particles().iter().map(|p| p.angle).collect()
    }

    #[test]
    fn test_missing_surface_is_a_silent_no_op() {
        let mut scheduler = MockFrameScheduler::new();
        scheduler.expect_request_frame().times(0);
        scheduler.expect_cancel_frame().times(0);

        let renderer = GalaxyRenderer::<MockSurface, _>::mount(
            None,
            scheduler,
            GalaxyParams::default(),
            &mut StdRng::seed_from_u64(1),
        );

        assert!(renderer.is_none());
    }

    #[test]
    fn test_mount_does_not_schedule_until_first_resize() {
        let renderer = headless(small_params());
        assert_eq!(renderer.pending_frame(), None);
        assert_eq!(renderer.scheduler().requested(), 0);
    }

    #[test]
    fn test_population_survives_resizes() {
        let mut renderer = headless(GalaxyParams::default());
        assert_eq!(renderer.particles().len(), 1200);

        renderer.on_resize(400.0, 300.0, 1.0);
        let before = angles(&renderer);

        for i in 0..5 {
            renderer.on_resize(400.0 + 10.0 * f64::from(i), 300.0, 2.0);
        }

        assert_eq!(renderer.particles().len(), 1200);
        assert_eq!(angles(&renderer), before);
    }

    #[test]
    fn test_resize_recomputes_radii() {
        let mut renderer = headless(small_params());

        renderer.on_resize(1000.0, 500.0, 1.0);
        assert_eq!(renderer.radii(), (480.0, 240.0));

        renderer.on_resize(200.0, 100.0, 1.0);
        assert_eq!(renderer.radii(), (96.0, 48.0));
    }

    #[test]
    fn test_first_resize_starts_the_loop_once() {
        let mut renderer = headless(small_params());

        renderer.on_resize(320.0, 240.0, 1.0);
        let first = renderer.pending_frame();
        assert!(first.is_some());

        renderer.on_resize(640.0, 480.0, 1.0);
        assert_eq!(renderer.pending_frame(), first);
        assert_eq!(renderer.scheduler().requested(), 1);
    }

    #[test]
    fn test_frame_advances_every_particle() {
        let mut renderer = headless(small_params());
        renderer.on_resize(320.0, 240.0, 1.0);
        let before = angles(&renderer);

        let handle = renderer.pending_frame().unwrap();
        renderer.on_frame(handle);

        for (p, old) in renderer.particles().iter().zip(before) {
            assert!((p.angle - (old + p.angular_velocity)).abs() < 1e-12);
        }
        assert_ne!(renderer.pending_frame(), Some(handle));
    }

    #[test]
    fn test_stale_frame_is_ignored() {
        let mut renderer = headless(small_params());
        renderer.on_resize(320.0, 240.0, 1.0);
        let before = angles(&renderer);

        renderer.on_frame(FrameHandle(9999));

        assert_eq!(angles(&renderer), before);
    }

    #[test]
    fn test_paint_sequence() {
        let mut surface = MockSurface::new();
        let mut seq = mockall::Sequence::new();
        surface
            .expect_resize()
            .withf(|w, h, dpr| *w == 200.0 && *h == 100.0 && *dpr == 2.0)
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        surface
            .expect_clear()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        surface
            .expect_fill_radial_glow()
            .withf(|c, r, _| *c == Point::new(100.0, 50.0) && (*r - 20.0).abs() < 1e-9)
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        surface.expect_fill_circle().return_const(());

        let mut scheduler = MockFrameScheduler::new();
        scheduler
            .expect_request_frame()
            .times(1)
            .return_const(FrameHandle(1));
        scheduler
            .expect_cancel_frame()
            .times(1)
            .return_const(());

        let mut renderer = GalaxyRenderer::mount(
            Some(surface),
            scheduler,
            small_params(),
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap();
        renderer.on_resize(200.0, 100.0, 2.0);
    }

    #[test]
    fn test_points_outside_surface_are_skipped() {
        // Zero-sized container: every projected point is on the boundary
        let mut surface = MockSurface::new();
        surface.expect_resize().return_const(());
        surface.expect_clear().return_const(());
        surface.expect_fill_radial_glow().return_const(());
        surface.expect_fill_circle().times(0);

        let mut renderer = GalaxyRenderer::mount(
            Some(surface),
            TickScheduler::default(),
            small_params(),
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap();
        renderer.on_resize(0.0, 0.0, 1.0);

        let handle = renderer.pending_frame().unwrap();
        renderer.on_frame(handle);
        assert!(renderer.particles().iter().all(|p| p.angle.is_finite()));
    }

    #[test]
    fn test_unmount_cancels_pending_frame_exactly_once() {
        let mut scheduler = MockFrameScheduler::new();
        scheduler
            .expect_request_frame()
            .times(2)
            .returning({
                let mut next = 0;
                move || {
                    next += 1;
                    FrameHandle(next)
                }
            });
        scheduler
            .expect_cancel_frame()
            .withf(|h| *h == FrameHandle(2))
            .times(1)
            .return_const(());

        let mut observer = MockResizeObserver::new();
        observer.expect_disconnect().times(1).return_const(());

        let mut renderer = GalaxyRenderer::mount(
            Some(PixelSurface::new()),
            scheduler,
            small_params(),
            &mut StdRng::seed_from_u64(9),
        )
        .unwrap();
        renderer.observe(Box::new(observer));

        renderer.on_resize(100.0, 100.0, 1.0);
        renderer.on_frame(FrameHandle(1));

        renderer.unmount();
        assert!(!renderer.is_mounted());
        assert_eq!(renderer.pending_frame(), None);

        // Neither late events nor the drop schedule or cancel anything
        renderer.on_frame(FrameHandle(2));
        renderer.on_resize(50.0, 50.0, 1.0);
        renderer.unmount();
        drop(renderer);
    }

    #[test]
    fn test_drop_unmounts() {
        let mut scheduler = MockFrameScheduler::new();
        scheduler
            .expect_request_frame()
            .times(1)
            .return_const(FrameHandle(11));
        scheduler
            .expect_cancel_frame()
            .withf(|h| *h == FrameHandle(11))
            .times(1)
            .return_const(());

        let mut renderer = GalaxyRenderer::mount(
            Some(PixelSurface::new()),
            scheduler,
            small_params(),
            &mut StdRng::seed_from_u64(9),
        )
        .unwrap();
        renderer.on_resize(100.0, 100.0, 1.0);
    }

    #[test]
    fn test_replacing_observer_disconnects_previous() {
        let mut first = MockResizeObserver::new();
        first.expect_disconnect().times(1).return_const(());
        let mut second = MockResizeObserver::new();
        second.expect_disconnect().times(1).return_const(());

        let mut renderer = headless(small_params());
        renderer.observe(Box::new(first));
        renderer.observe(Box::new(second));
    }
}
