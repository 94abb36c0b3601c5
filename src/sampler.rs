//! Image to particle field conversion.
//!
//! The sampler walks the fit-to-cover rectangle of the source image in a
//! square grid and turns every grid cell into one [`Particle`]. The grid step
//! starts at the requested dot size and is enlarged uniformly on both axes
//! whenever the naive grid would exceed the particle budget, so coverage
//! stays even instead of clipping an edge.
//!
//! # Example
//!
//! ```ignore
//! use pixelbeat::prelude::*;
//!
//! let image = PixelBuffer::from_file("cover.jpg")?;
//! let (field, layout) = build(Some(&image), 1280.0, 720.0, 16)?;
//! assert!(field.len() <= MAX_PARTICLES);
//! ```

use crate::error::BuildError;
use crate::layout::Layout;
use crate::particle::{
    grade_color, luminance_alpha, Particle, ParticleField, BASE_SIZE_FACTOR, MAX_PARTICLES,
};
use crate::source::PixelSource;
use crate::spawn::{base_seed, SpawnContext, POSITION_JITTER, VELOCITY_JITTER};
use glam::Vec2;

/// Number of grid cells visited along an axis of `length` pixels.
#[inline]
fn axis_cells(length: f32, step: u64) -> u64 {
    (length / step as f32).ceil().max(0.0) as u64
}

#[inline]
fn grid_cells(size: Vec2, step: u64) -> u64 {
    axis_cells(size.x, step).saturating_mul(axis_cells(size.y, step))
}

/// Largest fitted image side, in pixels, that can be sampled.
///
/// Past this a single grid step no longer covers the side exactly in `f32`.
pub const MAX_EXTENT: f32 = 1.0e15;

/// Grid step for sampling a `size` rectangle at `dot_size` with at most
/// `max_particles` cells.
///
/// When the naive `floor(w/dot) * floor(h/dot)` grid is over budget the step
/// becomes `ceil(dot * sqrt(naive / max))`. Because the walk visits
/// `ceil(w/step) * ceil(h/step)` cells, the smallest larger step that fits is
/// then searched for if that estimate is still over. The search never goes
/// past the longer side (clamped to [`MAX_EXTENT`]), where the grid is a
/// single cell.
pub fn sampling_step(size: Vec2, dot_size: u32, max_particles: usize) -> u64 {
    let dot = dot_size.max(1) as u64;
    let max = max_particles.max(1) as u64;
    let cap = (size.max_element().max(1.0).min(MAX_EXTENT).ceil() as u64).max(dot);

    let cols = ((size.x / dot as f32).floor() as u64).max(1);
    let rows = ((size.y / dot as f32).floor() as u64).max(1);
    let naive = cols.saturating_mul(rows);

    let mut step = dot;
    if naive > max {
        let scale = (naive as f64 / max as f64).sqrt();
        step = ((dot as f64 * scale).ceil() as u64).clamp(dot, cap);
    }

    if grid_cells(size, step) > max {
        if grid_cells(size, cap) > max {
            log::warn!("{:?} is too large to sample within budget", size);
            return cap;
        }
        // Cell count is non-increasing in step: bracket, then bisect.
        let mut lo = step;
        let mut hi = step.saturating_mul(2).min(cap);
        while grid_cells(size, hi) > max {
            lo = hi;
            hi = hi.saturating_mul(2).min(cap);
        }
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if grid_cells(size, mid) <= max {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        log::debug!(
            "sampling step {} still over budget, widened to {}",
            step,
            hi
        );
        step = hi;
    }

    step
}

/// Builds particle fields from pixel sources.
#[derive(Clone, Copy, Debug)]
pub struct Sampler {
    max_particles: usize,
    seed: Option<u64>,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler {
    /// Sampler with the full particle budget and clock-based jitter.
    pub fn new() -> Self {
        Self {
            max_particles: MAX_PARTICLES,
            seed: None,
        }
    }

    /// Fix the random seed so builds are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Lower the particle budget. Values above [`MAX_PARTICLES`] are capped.
    pub fn with_max_particles(mut self, max: usize) -> Self {
        self.max_particles = max.clamp(1, MAX_PARTICLES);
        self
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Sample `source` into a new particle field for a canvas of the given size.
    ///
    /// An absent or zero-sized source, or a zero-sized canvas, yields an empty
    /// field. A zero dot size or a negative / non-finite canvas is rejected.
    pub fn build<S: PixelSource + ?Sized>(
        &self,
        source: Option<&S>,
        canvas_width: f32,
        canvas_height: f32,
        dot_size: u32,
    ) -> Result<(ParticleField, Layout), BuildError> {
        if dot_size == 0 {
            return Err(BuildError::InvalidDotSize(dot_size));
        }
        let canvas = Vec2::new(canvas_width, canvas_height);
        if !canvas.is_finite() || canvas.x < 0.0 || canvas.y < 0.0 {
            return Err(BuildError::InvalidCanvas {
                width: canvas_width,
                height: canvas_height,
            });
        }

        let Some(source) = source else {
            return Ok((ParticleField::default(), Layout::default()));
        };
        let (src_w, src_h) = (source.width(), source.height());
        let Some(layout) = Layout::fit_to_cover(src_w, src_h, canvas) else {
            return Ok((ParticleField::default(), Layout::default()));
        };
        if layout.size.max_element() > MAX_EXTENT {
            return Err(BuildError::InvalidCanvas {
                width: canvas_width,
                height: canvas_height,
            });
        }

        let step = sampling_step(layout.size, dot_size, self.max_particles);
        let cols = axis_cells(layout.size.x, step);
        let rows = axis_cells(layout.size.y, step);
        let base_size = dot_size as f32 * BASE_SIZE_FACTOR;
        let seed = base_seed(self.seed);

        let mut particles = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            let y = (row * step) as f32;
            let src_y = ((y * src_h as f32 / layout.size.y).floor() as u32).min(src_h - 1);
            for col in 0..cols {
                let x = (col * step) as f32;
                let src_x = ((x * src_w as f32 / layout.size.x).floor() as u32).min(src_w - 1);
                let rgb = source.rgb(src_x, src_y);

                let mut ctx = SpawnContext::new(particles.len() as u32, seed);
                let particle = Particle::new(
                    layout.to_canvas(Vec2::new(x, y)),
                    grade_color(rgb),
                    luminance_alpha(rgb),
                    base_size,
                    ctx.noise_seed(),
                )
                .with_jitter(ctx.jitter(POSITION_JITTER), ctx.jitter(VELOCITY_JITTER));
                particles.push(particle);
            }
        }

        log::debug!(
            "sampled {}x{} source into {}x{} grid at step {} (dot size {})",
            src_w,
            src_h,
            cols,
            rows,
            step,
            dot_size
        );

        Ok((ParticleField::new(particles, layout, step), layout))
    }
}

/// Build a particle field with the default [`Sampler`].
pub fn build<S: PixelSource + ?Sized>(
    source: Option<&S>,
    canvas_width: f32,
    canvas_height: f32,
    dot_size: u32,
) -> Result<(ParticleField, Layout), BuildError> {
    Sampler::new().build(source, canvas_width, canvas_height, dot_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PixelBuffer;

    fn quad_image() -> PixelBuffer {
        // red, green / blue, white
        PixelBuffer::from_rgb(
            vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
            2,
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_two_by_two_grid() {
        let image = quad_image();
        let (field, layout) = Sampler::new()
            .with_seed(1)
            .build(Some(&image), 100.0, 100.0, 16)
            .unwrap();

        assert_eq!(layout.size, Vec2::new(100.0, 100.0));
        assert_eq!(field.step(), 16);
        assert_eq!(field.len(), 49);

        for p in field.iter() {
            let local = p.rest() - layout.origin;
            let sx = if local.x < 50.0 { 0 } else { 1 };
            let sy = if local.y < 50.0 { 0 } else { 1 };
            assert_eq!(p.color(), grade_color(image.rgb(sx, sy)));
            assert_eq!(p.alpha(), luminance_alpha(image.rgb(sx, sy)));
            assert!((p.base_size() - 11.2).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rest_positions_row_major() {
        let image = quad_image();
        let (field, _) = build(Some(&image), 100.0, 100.0, 16).unwrap();
        let rests: Vec<Vec2> = field.iter().map(|p| p.rest()).collect();
        assert_eq!(rests[0], Vec2::new(0.0, 0.0));
        assert_eq!(rests[1], Vec2::new(16.0, 0.0));
        assert_eq!(rests[7], Vec2::new(0.0, 16.0));
        assert_eq!(rests[48], Vec2::new(96.0, 96.0));
    }

    #[test]
    fn test_step_enlarged_for_dense_request() {
        let size = Vec2::new(2000.0, 2000.0);
        let step = sampling_step(size, 1, MAX_PARTICLES);
        // sqrt rule gives ceil(sqrt(4_000_000 / 500)) = 90, which still
        // visits 23 x 23 cells; the step must widen past that.
        assert!(step >= 90);
        assert!(grid_cells(size, step) <= MAX_PARTICLES as u64);
        assert!(grid_cells(size, step - 1) > MAX_PARTICLES as u64);
    }

    #[test]
    fn test_step_unchanged_under_budget() {
        assert_eq!(sampling_step(Vec2::new(100.0, 100.0), 16, MAX_PARTICLES), 16);
        // A dot bigger than the image still yields one cell.
        assert_eq!(sampling_step(Vec2::new(10.0, 10.0), 64, MAX_PARTICLES), 64);
    }

    #[test]
    fn test_budget_holds_on_extreme_inputs() {
        let sampler = Sampler::new().with_seed(3);
        let cases = [
            (PixelBuffer::solid(1, 1, [9, 9, 9]), 2000.0, 2000.0, 1),
            (PixelBuffer::solid(1, 400, [9, 9, 9]), 1280.0, 720.0, 2),
            (PixelBuffer::solid(400, 1, [9, 9, 9]), 1280.0, 720.0, 3),
            (PixelBuffer::solid(64, 64, [9, 9, 9]), 3840.0, 2160.0, 1),
            (PixelBuffer::solid(64, 64, [9, 9, 9]), 7.0, 5.0, 1),
        ];
        for (image, w, h, dot) in cases {
            let (field, _) = sampler.build(Some(&image), w, h, dot).unwrap();
            assert!(field.len() <= MAX_PARTICLES, "{} particles", field.len());
            assert!(!field.is_empty());
        }
    }

    #[test]
    fn test_budget_holds_on_huge_canvas() {
        let image = PixelBuffer::solid(1, 1, [9, 9, 9]);
        let (field, layout) = Sampler::new()
            .with_seed(3)
            .build(Some(&image), 1.0e12, 1.0e12, 1)
            .unwrap();
        assert!(!field.is_empty());
        assert!(field.len() <= MAX_PARTICLES, "{} particles", field.len());
        assert!(field.step() > u32::MAX as u64);
        for p in &field {
            assert!(layout.contains(p.rest()));
        }
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let image = PixelBuffer::solid(1, 1, [9, 9, 9]);
        assert!(matches!(
            build(Some(&image), 1.0e30, 1.0e30, 1),
            Err(BuildError::InvalidCanvas { .. })
        ));
    }

    #[test]
    fn test_step_search_terminates_past_extent() {
        let size = Vec2::new(1.0e30, 1.0e30);
        assert_eq!(sampling_step(size, 1, MAX_PARTICLES), MAX_EXTENT as u64);

        let size = Vec2::new(1.0e14, 5.0);
        let step = sampling_step(size, 1, MAX_PARTICLES);
        assert!(grid_cells(size, step) <= MAX_PARTICLES as u64);
    }

    #[test]
    fn test_lower_budget() {
        let image = PixelBuffer::solid(64, 64, [1, 2, 3]);
        let (field, _) = Sampler::new()
            .with_max_particles(50)
            .build(Some(&image), 640.0, 640.0, 4)
            .unwrap();
        assert!(field.len() <= 50);
        assert_eq!(Sampler::new().with_max_particles(10_000).max_particles(), MAX_PARTICLES);
    }

    #[test]
    fn test_missing_or_empty_source() {
        let (field, layout) = build::<PixelBuffer>(None, 100.0, 100.0, 16).unwrap();
        assert!(field.is_empty());
        assert_eq!(layout, Layout::default());

        let empty = PixelBuffer::from_rgba(Vec::new(), 0, 0).unwrap();
        assert!(build(Some(&empty), 100.0, 100.0, 16).unwrap().0.is_empty());
        assert!(build(Some(&quad_image()), 0.0, 100.0, 16).unwrap().0.is_empty());
    }

    #[test]
    fn test_invalid_input_rejected() {
        let image = quad_image();
        assert_eq!(
            build(Some(&image), 100.0, 100.0, 0).unwrap_err(),
            BuildError::InvalidDotSize(0)
        );
        assert!(matches!(
            build(Some(&image), f32::NAN, 100.0, 16),
            Err(BuildError::InvalidCanvas { .. })
        ));
        assert!(matches!(
            build(Some(&image), -1.0, 100.0, 16),
            Err(BuildError::InvalidCanvas { .. })
        ));
    }

    #[test]
    fn test_initial_jitter_bounds() {
        let image = quad_image();
        let (field, _) = build(Some(&image), 100.0, 100.0, 16).unwrap();
        for p in field.iter() {
            let offset = p.position() - p.rest();
            assert!(offset.x.abs() <= POSITION_JITTER && offset.y.abs() <= POSITION_JITTER);
            assert!(p.velocity().x.abs() <= VELOCITY_JITTER);
            assert!(p.velocity().y.abs() <= VELOCITY_JITTER);
        }
    }

    #[test]
    fn test_seeded_builds_identical() {
        let image = PixelBuffer::checkerboard(32, 4, [200, 10, 10], [10, 10, 200]);
        let sampler = Sampler::new().with_seed(42);
        let a = sampler.build(Some(&image), 320.0, 240.0, 8).unwrap();
        let b = sampler.build(Some(&image), 320.0, 240.0, 8).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_share_anchors() {
        let image = PixelBuffer::checkerboard(32, 4, [200, 10, 10], [10, 10, 200]);
        let (a, _) = Sampler::new().with_seed(1).build(Some(&image), 320.0, 240.0, 8).unwrap();
        let (b, _) = Sampler::new().with_seed(2).build(Some(&image), 320.0, 240.0, 8).unwrap();
        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert_eq!(pa.rest(), pb.rest());
            assert_eq!(pa.color(), pb.color());
            assert_eq!(pa.alpha(), pb.alpha());
        }
    }
}
