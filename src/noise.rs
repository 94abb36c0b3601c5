//! Smooth procedural noise.
//!
//! CPU counterparts of the hash and noise helpers used to decorrelate particle
//! motion. Everything here is a pure function of its inputs.
//!
//! - `hash(n: u32) -> u32` - integer avalanche hash
//! - `hash2(x, y) -> u32` - hash of a 2D lattice coordinate
//! - `rand(seed) -> f32` - pseudo-random float in [0, 1)
//! - `noise2(x, y) -> f32` - fractal value noise in [0, 1)

/// Hash a u32 to a pseudo-random u32.
#[inline]
pub fn hash(n: u32) -> u32 {
    let mut x = n;
    x ^= x >> 17;
    x = x.wrapping_mul(0xed5a_d4bb);
    x ^= x >> 11;
    x = x.wrapping_mul(0xac4c_1b51);
    x ^= x >> 15;
    x = x.wrapping_mul(0x3184_8bab);
    x ^= x >> 14;
    x
}

/// Hash a 2D lattice coordinate.
#[inline]
pub fn hash2(x: u32, y: u32) -> u32 {
    hash(x.wrapping_add(hash(y)))
}

/// Pseudo-random float in [0, 1).
#[inline]
pub fn rand(seed: u32) -> f32 {
    // 24 significant bits so the result is exactly representable and < 1.0
    (hash(seed) >> 8) as f32 / (1u32 << 24) as f32
}

#[inline]
fn lattice(x: i32, y: i32) -> f32 {
    (hash2(x as u32, y as u32) >> 8) as f32 / (1u32 << 24) as f32
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Single octave of smoothly interpolated lattice noise in [0, 1).
pub fn value2(x: f32, y: f32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let ix = x0 as i32;
    let iy = y0 as i32;
    let tx = fade(x - x0);
    let ty = fade(y - y0);

    let a = lattice(ix, iy);
    let b = lattice(ix.wrapping_add(1), iy);
    let c = lattice(ix, iy.wrapping_add(1));
    let d = lattice(ix.wrapping_add(1), iy.wrapping_add(1));

    let top = a + (b - a) * tx;
    let bottom = c + (d - c) * tx;
    top + (bottom - top) * ty
}

/// Octave configuration for fractal noise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseField {
    /// Number of octaves summed.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub falloff: f32,
}

impl Default for NoiseField {
    fn default() -> Self {
        Self {
            octaves: 4,
            falloff: 0.5,
        }
    }
}

impl NoiseField {
    /// Sample fractal noise at `(x, y)`. Result is in [0, 1).
    ///
    /// Each octave doubles the frequency; the weighted sum is normalised by
    /// the total amplitude so the range does not depend on `octaves`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let octaves = self.octaves.max(1);
        let mut value = 0.0;
        let mut total = 0.0;
        let mut amplitude = self.falloff;
        let mut frequency = 1.0;
        for _ in 0..octaves {
            value += amplitude * value2(x * frequency, y * frequency);
            total += amplitude;
            frequency *= 2.0;
            amplitude *= self.falloff;
        }
        if total <= 0.0 {
            return 0.0;
        }
        // Guard the open upper bound against rounding in the weighted sum.
        (value / total).clamp(0.0, 1.0 - f32::EPSILON)
    }
}

/// Fractal noise with the default octave settings. Result is in [0, 1).
#[inline]
pub fn noise2(x: f32, y: f32) -> f32 {
    NoiseField::default().sample(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash(12345), hash(12345));
        assert_ne!(hash(1), hash(2));
        assert_ne!(hash2(1, 2), hash2(2, 1));
    }

    #[test]
    fn test_rand_range() {
        for seed in 0..10_000 {
            let r = rand(seed);
            assert!((0.0..1.0).contains(&r));
        }
    }

    #[test]
    fn test_noise_range() {
        let mut x = -50.0;
        while x < 1100.0 {
            let n = noise2(x, x * 0.37 + 100.0);
            assert!((0.0..1.0).contains(&n), "noise2({}) = {}", x, n);
            x += 0.173;
        }
    }

    #[test]
    fn test_noise_is_smooth() {
        let step = 0.01;
        let mut x = 0.0;
        while x < 20.0 {
            let delta = (noise2(x + step, 3.5) - noise2(x, 3.5)).abs();
            assert!(delta < 0.1, "jump of {} at {}", delta, x);
            x += step;
        }
    }

    #[test]
    fn test_noise_matches_lattice_at_integers() {
        let field = NoiseField { octaves: 1, falloff: 0.5 };
        assert!((field.sample(3.0, 4.0) - lattice(3, 4)).abs() < 1e-6);
    }

    #[test]
    fn test_noise_varies() {
        let samples: Vec<f32> = (0..100).map(|i| noise2(i as f32 * 0.7, 0.5)).collect();
        let min = samples.iter().cloned().fold(f32::MAX, f32::min);
        let max = samples.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max - min > 0.2);
    }
}
