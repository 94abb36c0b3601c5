//! Per-tick force integration.
//!
//! Every tick each particle accumulates a force from every entry in the
//! integrator's force list, then velocity and position are advanced:
//!
//! ```text
//! velocity = (velocity + Σ force) * damping
//! position = position + velocity
//! ```
//!
//! All forces are scaled by the tick's audio force, a 0.0-2.2 scalar derived
//! from bass energy. Damping is the only energy sink; with no forcing the
//! spring settles every particle on its anchor.
//!
//! # Force list
//!
//! | Force | Contribution |
//! |-------|--------------|
//! | [`Force::Spring`] | `(rest - position) * stiffness * (1 + audio)` |
//! | [`Force::Noise`] | `(noise - 0.5) * chaos * gain` per axis |
//! | [`Force::PointerRepel`] | linear falloff push away from the pointer |
//!
//! Particles never read each other, so the tick may process them in any
//! order. With the `parallel` feature the pass runs on the rayon pool.

use crate::config::SimulationConfig;
use crate::input::Pointer;
use crate::noise::NoiseField;
use crate::particle::{Particle, ParticleField};
use glam::Vec2;

/// Base spring constant toward the rest position.
pub const SPRING_STIFFNESS: f32 = 0.08;

/// Noise force gain applied on top of chaos strength.
pub const NOISE_GAIN: f32 = 0.45;

/// Noise offset between the x and y force samples.
pub const NOISE_AXIS_OFFSET: f32 = 100.0;

/// Noise time advanced per tick.
pub const NOISE_TIME_STEP: f64 = 0.01;

/// Pointer influence radius in canvas pixels.
pub const MOUSE_RADIUS: f32 = 120.0;

/// Pointer push at zero distance, before audio scaling.
pub const MOUSE_FORCE: f32 = 3.0;

/// Velocity retained per tick.
pub const DAMPING: f32 = 0.88;

/// Audio force at full-scale bass.
pub const MAX_AUDIO_FORCE: f32 = 2.2;

/// Nominal full-scale bass energy.
pub const AUDIO_FULL_SCALE: f32 = 255.0;

/// Added to pointer distances so the push direction never divides by zero.
pub const DISTANCE_EPSILON: f32 = 1e-4;

/// Map bass energy to the audio force scalar.
///
/// `amplitude * bass_multiplier` is clamped to `[0, 255 * bass_multiplier]`
/// and mapped linearly onto `[0, MAX_AUDIO_FORCE]`. Non-finite input or a
/// non-positive multiplier gives 0.
pub fn audio_force(amplitude: f32, bass_multiplier: f32) -> f32 {
    let cap = AUDIO_FULL_SCALE * bass_multiplier;
    if !cap.is_finite() || cap <= 0.0 {
        return 0.0;
    }
    let driven = amplitude * bass_multiplier;
    if driven.is_nan() {
        return 0.0;
    }
    driven.clamp(0.0, cap) / cap * MAX_AUDIO_FORCE
}

/// Noise time for a tick counter.
#[inline]
pub fn noise_time(tick: u64) -> f32 {
    (tick as f64 * NOISE_TIME_STEP) as f32
}

/// Magnitude of the pointer push at `distance` (already including
/// [`DISTANCE_EPSILON`]). Zero at or beyond `radius`.
#[inline]
pub fn repulsion_magnitude(distance: f32, radius: f32, strength: f32, audio_force: f32) -> f32 {
    if distance >= radius || radius <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / radius) * strength * (1.0 + audio_force)
}

/// Push on a particle at `offset` from the pointer.
///
/// A particle exactly on the pointer is pushed along `fallback` (a unit
/// vector) with the full magnitude.
pub fn repulsion(offset: Vec2, radius: f32, strength: f32, audio_force: f32, fallback: Vec2) -> Vec2 {
    let length = offset.length();
    let distance = length + DISTANCE_EPSILON;
    let push = repulsion_magnitude(distance, radius, strength, audio_force);
    if push == 0.0 {
        return Vec2::ZERO;
    }
    if length > 0.0 {
        offset / distance * push
    } else {
        fallback * push
    }
}

/// Inputs shared by every particle during one tick. Read-only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickContext {
    /// Audio force scalar in `0.0..=MAX_AUDIO_FORCE`.
    pub audio_force: f32,
    /// Noise time for this tick.
    pub time: f32,
    pub pointer: Pointer,
    pub chaos_strength: f32,
}

impl TickContext {
    pub fn new(amplitude: f32, pointer: Pointer, tick: u64, config: &SimulationConfig) -> Self {
        Self {
            audio_force: audio_force(amplitude, config.bass_multiplier),
            time: noise_time(tick),
            pointer,
            chaos_strength: config.chaos_strength.max(0.0),
        }
    }
}

/// A force contribution evaluated once per particle per tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Force {
    /// Hooke spring toward the rest position.
    ///
    /// Stiffness grows with audio: `k = stiffness * (1 + audio_force)`, so
    /// particles snap back harder on beats.
    Spring {
        /// Base spring constant.
        stiffness: f32,
    },

    /// Smooth wandering from the shared noise field.
    ///
    /// The x force samples noise at `seed + t`, the y force at
    /// `seed + axis_offset + t`, so the two axes are decorrelated.
    Noise {
        /// Gain on top of chaos strength.
        gain: f32,
        /// Noise-space distance between the x and y samples.
        axis_offset: f32,
        /// Octave settings.
        field: NoiseField,
    },

    /// Push away from the pointer with linear falloff to zero at `radius`.
    ///
    /// Scaled by `(1 + audio_force)`.
    PointerRepel {
        /// Effect radius in pixels.
        radius: f32,
        /// Push at zero distance.
        strength: f32,
    },
}

impl Force {
    /// Spring with the default stiffness.
    pub fn spring() -> Self {
        Force::Spring {
            stiffness: SPRING_STIFFNESS,
        }
    }

    /// Noise with the default gain and axis offset.
    pub fn noise() -> Self {
        Force::Noise {
            gain: NOISE_GAIN,
            axis_offset: NOISE_AXIS_OFFSET,
            field: NoiseField::default(),
        }
    }

    /// Pointer repulsion with the default radius and strength.
    pub fn pointer_repel() -> Self {
        Force::PointerRepel {
            radius: MOUSE_RADIUS,
            strength: MOUSE_FORCE,
        }
    }

    /// Force on `particle` for this tick.
    pub fn apply(&self, particle: &Particle, ctx: &TickContext) -> Vec2 {
        match self {
            Force::Spring { stiffness } => {
                let k = stiffness * (1.0 + ctx.audio_force);
                (particle.rest - particle.position) * k
            }

            Force::Noise {
                gain,
                axis_offset,
                field,
            } => {
                if ctx.chaos_strength == 0.0 {
                    return Vec2::ZERO;
                }
                let seed = particle.noise_seed();
                let nx = field.sample(seed + ctx.time, 0.0);
                let ny = field.sample(seed + axis_offset + ctx.time, 0.0);
                (Vec2::new(nx, ny) - 0.5) * ctx.chaos_strength * gain
            }

            Force::PointerRepel { radius, strength } => match ctx.pointer {
                Pointer::At(pointer) => repulsion(
                    particle.position - pointer,
                    *radius,
                    *strength,
                    ctx.audio_force,
                    Vec2::from_angle(particle.noise_seed()),
                ),
                Pointer::Absent => Vec2::ZERO,
            },
        }
    }
}

/// Advances a particle field one tick at a time.
#[derive(Clone, Debug, PartialEq)]
pub struct Integrator {
    forces: Vec<Force>,
    damping: f32,
}

impl Default for Integrator {
    /// Spring, noise and pointer repulsion with [`DAMPING`].
    fn default() -> Self {
        Self {
            forces: vec![Force::spring(), Force::noise(), Force::pointer_repel()],
            damping: DAMPING,
        }
    }
}

impl Integrator {
    /// Integrator with no forces; particles only coast and slow down.
    pub fn empty() -> Self {
        Self {
            forces: Vec::new(),
            damping: DAMPING,
        }
    }

    /// Append a force.
    pub fn with_force(mut self, force: Force) -> Self {
        self.forces.push(force);
        self
    }

    /// Set the fraction of velocity kept each tick (clamped to 0.0-1.0).
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Advance one particle.
    #[inline]
    pub fn step_particle(&self, particle: &mut Particle, ctx: &TickContext) {
        let force: Vec2 = self.forces.iter().map(|f| f.apply(particle, ctx)).sum();
        particle.velocity = (particle.velocity + force) * self.damping;
        particle.position += particle.velocity;
    }

    /// Advance every particle in `field` by one tick.
    ///
    /// `amplitude` is the bass energy (0-255 nominal, 0 when no audio is
    /// playing), `tick` the monotonic tick counter.
    pub fn tick(
        &self,
        field: &mut ParticleField,
        amplitude: f32,
        pointer: Pointer,
        tick: u64,
        config: &SimulationConfig,
    ) {
        let ctx = TickContext::new(amplitude, pointer, tick, config);
        self.tick_with(field, &ctx);
    }

    /// Advance every particle with a prepared context.
    #[cfg(not(feature = "parallel"))]
    pub fn tick_with(&self, field: &mut ParticleField, ctx: &TickContext) {
        for p in field.particles_mut() {
            self.step_particle(p, ctx);
        }
    }

    /// Advance every particle with a prepared context, on the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn tick_with(&self, field: &mut ParticleField, ctx: &TickContext) {
        use rayon::prelude::*;
        field
            .particles_mut()
            .par_iter_mut()
            .for_each(|p| self.step_particle(p, ctx));
    }
}

/// Advance `field` one tick with the default [`Integrator`].
pub fn tick(
    field: &mut ParticleField,
    amplitude: f32,
    pointer: Pointer,
    tick: u64,
    config: &SimulationConfig,
) {
    Integrator::default().tick(field, amplitude, pointer, tick, config);
}
