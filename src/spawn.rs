//! Per-particle random state used while building a field.
//!
//! Every particle gets its own small RNG derived from a base seed and its
//! slot index. With a fixed base seed a build is fully reproducible; without
//! one the seed is taken from the clock so each run looks different.

use crate::noise::hash;
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Initial position jitter, in pixels per axis.
pub const POSITION_JITTER: f32 = 5.0;

/// Initial velocity jitter, in pixels per tick per axis.
pub const VELOCITY_JITTER: f32 = 0.5;

/// Noise seeds are drawn from `0.0..NOISE_SEED_RANGE`.
pub const NOISE_SEED_RANGE: f32 = 1000.0;

/// Base seed for a build: fixed, or taken from the clock.
pub fn base_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    })
}

/// Random helpers for one particle slot.
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Context for slot `index` under `base_seed`.
    pub fn new(index: u32, base_seed: u64) -> Self {
        let seed = base_seed ^ (hash(index) as u64).rotate_left(32) ^ index as u64;
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 in the given range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Random vector with each component in `-magnitude..magnitude`.
    pub fn jitter(&mut self, magnitude: f32) -> Vec2 {
        if magnitude <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            self.rng.gen_range(-magnitude..magnitude),
            self.rng.gen_range(-magnitude..magnitude),
        )
    }

    /// Offset into the shared noise field.
    pub fn noise_seed(&mut self) -> f32 {
        self.random_range(0.0, NOISE_SEED_RANGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SpawnContext::new(7, 99);
        let mut b = SpawnContext::new(7, 99);
        assert_eq!(a.jitter(POSITION_JITTER), b.jitter(POSITION_JITTER));
        assert_eq!(a.noise_seed(), b.noise_seed());
    }

    #[test]
    fn test_slots_are_decorrelated() {
        let mut a = SpawnContext::new(0, 99);
        let mut b = SpawnContext::new(1, 99);
        assert_ne!(a.noise_seed(), b.noise_seed());
    }

    #[test]
    fn test_jitter_bounds() {
        let mut ctx = SpawnContext::new(0, 1);
        for _ in 0..1000 {
            let j = ctx.jitter(POSITION_JITTER);
            assert!(j.x >= -POSITION_JITTER && j.x < POSITION_JITTER);
            assert!(j.y >= -POSITION_JITTER && j.y < POSITION_JITTER);
            let s = ctx.noise_seed();
            assert!((0.0..NOISE_SEED_RANGE).contains(&s));
        }
        assert_eq!(ctx.jitter(0.0), Vec2::ZERO);
    }

    #[test]
    fn test_fixed_base_seed() {
        assert_eq!(base_seed(Some(5)), 5);
    }
}
