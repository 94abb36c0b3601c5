//! Particle records and the field that owns them.
//!
//! A [`Particle`] is created once by the sampler. Its anchor, colour, alpha,
//! base size and noise seed never change afterwards; only position and
//! velocity are advanced by the integrator.

use crate::layout::Layout;
use glam::{Vec2, Vec3};

/// Upper bound on the number of particles in a field.
pub const MAX_PARTICLES: usize = 500;

/// Base size as a fraction of the configured dot size.
pub const BASE_SIZE_FACTOR: f32 = 0.7;

/// Green channel gain of the colour grade.
pub const GREEN_GAIN: f32 = 0.6;

/// Green channel ceiling (0-255 scale) of the colour grade.
pub const GREEN_CEILING: f32 = 180.0;

/// Lower bound on particle alpha.
pub const MIN_ALPHA: f32 = 0.3;

/// Apply the fixed colour grade to a source pixel.
///
/// Red and blue pass through, green is scaled by [`GREEN_GAIN`] and capped at
/// [`GREEN_CEILING`]. The result is normalised to 0.0-1.0.
pub fn grade_color(rgb: [u8; 3]) -> Vec3 {
    let r = (rgb[0] as f32).clamp(0.0, 255.0);
    let g = (rgb[1] as f32 * GREEN_GAIN).clamp(0.0, GREEN_CEILING);
    let b = (rgb[2] as f32).clamp(0.0, 255.0);
    Vec3::new(r, g, b) / 255.0
}

/// Alpha from the average luminance of the raw (ungraded) pixel.
pub fn luminance_alpha(rgb: [u8; 3]) -> f32 {
    let sum = rgb[0] as f32 + rgb[1] as f32 + rgb[2] as f32;
    (sum / (3.0 * 255.0)).clamp(MIN_ALPHA, 1.0)
}

/// Render size multiplier for a given audio force.
#[inline]
pub fn size_scale(audio_force: f32) -> f32 {
    0.5 + 2.8 * audio_force
}

/// A single sampled dot.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub(crate) rest: Vec2,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    color: Vec3,
    alpha: f32,
    base_size: f32,
    noise_seed: f32,
}

impl Particle {
    /// Create a particle at rest with zero velocity.
    pub fn new(rest: Vec2, color: Vec3, alpha: f32, base_size: f32, noise_seed: f32) -> Self {
        Self {
            rest,
            position: rest,
            velocity: Vec2::ZERO,
            color,
            alpha,
            base_size,
            noise_seed,
        }
    }

    /// Offset the initial position and velocity.
    pub fn with_jitter(mut self, position: Vec2, velocity: Vec2) -> Self {
        self.position = self.rest + position;
        self.velocity = velocity;
        self
    }

    /// Anchor the spring pulls toward, in canvas pixels.
    #[inline]
    pub fn rest(&self) -> Vec2 {
        self.rest
    }

    /// Current position in canvas pixels.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current velocity in pixels per tick.
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Graded RGB colour, each channel 0.0-1.0.
    #[inline]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    #[inline]
    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    #[inline]
    pub fn noise_seed(&self) -> f32 {
        self.noise_seed
    }

    /// Side length to draw this tick. Derived, never stored.
    #[inline]
    pub fn render_size(&self, audio_force: f32) -> f32 {
        self.base_size * size_scale(audio_force)
    }

    /// GPU-ready snapshot of this particle.
    pub fn instance(&self, audio_force: f32) -> ParticleInstance {
        ParticleInstance {
            position: self.position.to_array(),
            size: self.render_size(audio_force),
            alpha: self.alpha,
            color: self.color.to_array(),
            _pad: 0.0,
        }
    }
}

/// Per-particle record laid out for vertex/instance buffers.
///
/// 32 bytes, no implicit padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub size: f32,
    pub alpha: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

/// The complete particle set produced by one build.
///
/// Replaced wholesale on every structural change, never patched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
    layout: Layout,
    step: u64,
}

impl ParticleField {
    pub(crate) fn new(particles: Vec<Particle>, layout: Layout, step: u64) -> Self {
        debug_assert!(particles.len() <= MAX_PARTICLES);
        Self {
            particles,
            layout,
            step,
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether there is nothing to render.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Read-only view of every particle.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Layout the field was built against.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Effective sampling step in pixels (0 for an empty field).
    #[inline]
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Instance buffer contents for a renderer.
    pub fn instances(&self, audio_force: f32) -> Vec<ParticleInstance> {
        self.particles.iter().map(|p| p.instance(audio_force)).collect()
    }

    /// Largest distance of any particle from its anchor.
    pub fn max_displacement(&self) -> f32 {
        self.particles
            .iter()
            .map(|p| (p.position - p.rest).length())
            .fold(0.0, f32::max)
    }
}

impl<'a> IntoIterator for &'a ParticleField {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_color() {
        let c = grade_color([255, 255, 255]);
        assert_eq!(c.x, 1.0);
        assert!((c.y - 153.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.z, 1.0);

        // 0.6 * 100 = 60, under the ceiling
        assert!((grade_color([0, 100, 0]).y - 60.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_luminance_alpha_clamped() {
        assert_eq!(luminance_alpha([0, 0, 0]), MIN_ALPHA);
        assert_eq!(luminance_alpha([255, 255, 255]), 1.0);
        let mid = luminance_alpha([153, 153, 153]);
        assert!((mid - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_render_size() {
        let p = Particle::new(Vec2::ZERO, Vec3::ONE, 1.0, 16.0 * BASE_SIZE_FACTOR, 0.0);
        assert!((p.render_size(0.0) - 5.6).abs() < 1e-5);
        assert!((p.render_size(2.2) - 11.2 * (0.5 + 6.16)).abs() < 1e-3);
    }

    #[test]
    fn test_jitter_keeps_rest() {
        let p = Particle::new(Vec2::new(10.0, 20.0), Vec3::ZERO, 0.5, 1.0, 3.0)
            .with_jitter(Vec2::new(2.0, -3.0), Vec2::new(0.1, 0.2));
        assert_eq!(p.rest(), Vec2::new(10.0, 20.0));
        assert_eq!(p.position(), Vec2::new(12.0, 17.0));
        assert_eq!(p.velocity(), Vec2::new(0.1, 0.2));
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 32);
        let p = Particle::new(Vec2::new(1.0, 2.0), Vec3::new(0.1, 0.2, 0.3), 0.4, 2.0, 0.0);
        let field = ParticleField::new(vec![p], Layout::default(), 16);
        let instances = field.instances(0.0);
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 32);
        assert_eq!(instances[0].position, [1.0, 2.0]);
        assert_eq!(instances[0].size, 1.0);
    }
}
