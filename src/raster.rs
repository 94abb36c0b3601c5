//! CPU rasteriser for particle fields.
//!
//! Draws each particle as a rounded square of its render size with a soft
//! glow, alpha-blended over black. Intended for headless runs, snapshots and
//! tests; interactive renderers should upload [`ParticleField::instances`]
//! instead.

use crate::particle::ParticleField;
use glam::{Vec2, Vec3};
use image::{Rgba, RgbaImage};

/// Corner radius of each dot in pixels.
pub const CORNER_RADIUS: f32 = 2.0;

/// Glow width as a fraction of render size.
pub const GLOW_FACTOR: f32 = 0.6;

/// Minimum glow width in pixels.
pub const MIN_GLOW: f32 = 0.3;

/// Glow opacity relative to particle alpha.
pub const GLOW_ALPHA: f32 = 0.7;

/// Signed distance from `p` to a rounded square centred at the origin.
fn rounded_square_sdf(p: Vec2, half: f32, radius: f32) -> f32 {
    let radius = radius.min(half);
    let q = p.abs() - Vec2::splat(half - radius);
    q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0) - radius
}

/// Linear-space RGB accumulation buffer.
struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; width as usize * height as usize],
        }
    }

    #[inline]
    fn blend(&mut self, x: u32, y: u32, color: Vec3, alpha: f32) {
        let px = &mut self.pixels[x as usize + y as usize * self.width as usize];
        *px = color * alpha + *px * (1.0 - alpha);
    }

    fn into_image(self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width, self.height);
        for (i, px) in self.pixels.into_iter().enumerate() {
            let x = i as u32 % self.width;
            let y = i as u32 / self.width;
            let c = (px.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
            img.put_pixel(x, y, Rgba([c.x as u8, c.y as u8, c.z as u8, 255]));
        }
        img
    }
}

/// Render `field` into a `width` x `height` image for the given audio force.
pub fn render_frame(field: &ParticleField, audio_force: f32, width: u32, height: u32) -> RgbaImage {
    let mut canvas = Canvas::new(width, height);
    if width == 0 || height == 0 {
        return canvas.into_image();
    }

    for particle in field {
        let size = particle.render_size(audio_force);
        if size.is_nan() || size <= 0.0 {
            continue;
        }
        let half = size * 0.5;
        let glow = (size * GLOW_FACTOR).max(MIN_GLOW);
        let centre = particle.position();
        let reach = half + glow;

        let min = (centre - reach).floor().max(Vec2::ZERO);
        let max = (centre + reach).ceil().min(Vec2::new(width as f32, height as f32));
        if min.x >= max.x || min.y >= max.y {
            continue;
        }

        let color = particle.color();
        let alpha = particle.alpha();
        for y in min.y as u32..max.y as u32 {
            for x in min.x as u32..max.x as u32 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - centre;
                let dist = rounded_square_sdf(p, half, CORNER_RADIUS);

                // Body coverage with a one-pixel antialiased edge.
                let body = (0.5 - dist).clamp(0.0, 1.0);
                let halo = if dist > 0.0 {
                    (1.0 - dist / glow).clamp(0.0, 1.0) * GLOW_ALPHA
                } else {
                    0.0
                };
                let coverage = body.max(halo) * alpha;
                if coverage > 0.0 {
                    canvas.blend(x, y, color, coverage);
                }
            }
        }
    }

    canvas.into_image()
}
