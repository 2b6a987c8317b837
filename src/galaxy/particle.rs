use rand::Rng;
use rand::seq::SliceRandom;
use std::f64::consts::PI;

use super::{Point, Rgba};

const PALETTE: &[Rgba] = &[
    Rgba::rgb(0xff, 0xff, 0xff),
    Rgba::rgb(0xfd, 0xe0, 0x47),
    Rgba::rgb(0xa7, 0x8b, 0xfa),
    Rgba::rgb(0x7d, 0xd3, 0xfc),
];

/// Shape and motion constants of the particle field.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyParams {
    pub particle_count: usize,
    pub arms: u32,
    pub arm_tightness: f64,
    /// Total winding of an arm, in radians before dividing by tightness.
    pub arm_winding: f64,
    /// Keeps the angular scatter finite at the centre.
    pub fuzz_epsilon: f64,
    pub fuzz_scale: f64,
    /// Angular velocity of a rim particle, radians per frame.
    pub base_velocity: f64,
    /// Extra angular velocity at the centre, radians per frame.
    pub velocity_scale: f64,
    pub min_size: f64,
    pub size_spread: f64,
    pub min_opacity: f64,
    pub opacity_spread: f64,
    pub palette: &'static [Rgba],
    /// Fraction of the half-width/half-height the outermost particles reach.
    pub fill_factor: f64,
    /// Core glow radius as a fraction of the surface width.
    pub core_radius_factor: f64,
    pub core_color: Rgba,
}

impl Default for GalaxyParams {
    fn default() -> Self {
        Self {
            particle_count: 1200,
            arms: 3,
            arm_tightness: 0.5,
            arm_winding: 20.0,
            fuzz_epsilon: 0.1,
            fuzz_scale: 0.5,
            base_velocity: 0.0001,
            velocity_scale: 0.001,
            min_size: 0.5,
            size_spread: 2.2,
            min_opacity: 0.3,
            opacity_spread: 0.7,
            palette: PALETTE,
            fill_factor: 0.96,
            core_radius_factor: 0.1,
            core_color: Rgba::rgb(253, 224, 71).with_alpha(0.3),
        }
    }
}

impl GalaxyParams {
    /// Angular velocity at a normalized radius. Strictly decreasing in
    /// `normalized_radius`, so inner particles overtake outer ones.
    pub fn angular_velocity(&self, normalized_radius: f64) -> f64 {
        self.base_velocity + (1.0 - normalized_radius) * self.velocity_scale
    }
}

/// One decorative particle.
///
/// Only `angle` changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Distance from the centre in `0.0..1.0`.
    pub normalized_radius: f64,
    /// Accumulates without bound; only used through `sin`/`cos`.
    pub angle: f64,
    pub angular_velocity: f64,
    pub size: f64,
    pub opacity: f64,
    pub color: Rgba,
}

impl Particle {
    /// Move one frame along the orbit.
    pub fn advance(&mut self) {
        self.angle += self.angular_velocity;
    }

    /// Position on an ellipse with semi-axes `radii` around `center`.
    pub fn project(&self, center: Point, radii: (f64, f64)) -> Point {
        Point {
            x: center.x + self.normalized_radius * radii.0 * self.angle.cos(),
            y: center.y + self.normalized_radius * radii.1 * self.angle.sin(),
        }
    }
}

/// Scatter `params.particle_count` particles along the spiral arms.
///
/// Radii are drawn as `u^1.5`, which crowds particles towards the core. The
/// angular scatter grows towards the centre, so arms are wide near the core
/// and tight at the rim.
pub fn generate_particles<R: Rng + ?Sized>(params: &GalaxyParams, rng: &mut R) -> Vec<Particle> {
    let arms = params.arms.max(1);
    let arm_spacing = 2.0 * PI / f64::from(arms);

    (0..params.particle_count)
        .map(|_| {
            let normalized_radius = rng.r#gen::<f64>().powf(1.5);
            let spiral_angle = normalized_radius * params.arm_winding / params.arm_tightness;
            let arm_offset = f64::from(rng.gen_range(0..arms)) * arm_spacing;
            let fuzz = rng.r#gen::<f64>().powi(2) * (1.0 / (normalized_radius + params.fuzz_epsilon))
                * params.fuzz_scale;

            Particle {
                normalized_radius,
                angle: spiral_angle + arm_offset + fuzz,
                angular_velocity: params.angular_velocity(normalized_radius),
                size: rng.r#gen::<f64>() * params.size_spread + params.min_size,
                opacity: rng.r#gen::<f64>() * params.opacity_spread + params.min_opacity,
                color: params
                    .palette
                    .choose(rng)
                    .copied()
                    .unwrap_or(Rgba::rgb(0xff, 0xff, 0xff)),
            }
        })
        .collect()
}
