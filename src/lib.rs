//! # Pixelbeat - audio-reactive image particles
//!
//! Samples an image into a grid of at most [`MAX_PARTICLES`] colored particles
//! and moves them every tick with three forces: a spring back to where each
//! particle was sampled, a noise drift, and a repulsion away from the pointer.
//! All three are scaled by the bass energy of whatever audio is playing.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pixelbeat::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let image = PixelBuffer::from_file("cover.png")?;
//!     let mut sim = Simulation::new(SimulationConfig::default())
//!         .with_source(image)
//!         .with_canvas_size(1280.0, 720.0)
//!         .build()?;
//!
//!     let mut audio = PulseTrack::new(120.0, 60.0);
//!     for _ in 0..600 {
//!         sim.step(&mut audio, Pointer::at(640.0, 360.0));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Sampling
//!
//! [`Sampler::build`] fits the image to cover the canvas, picks a grid step of
//! at least the dot size that keeps the particle count within budget, and
//! reads one pixel per grid cell. Colors are graded (green is damped) and
//! brightness becomes opacity.
//!
//! ### Forces
//!
//! Each tick the [`Integrator`] sums its [`Force`]s for every particle, adds
//! the result to velocity, damps it, and moves the particle:
//!
//! ```ignore
//! let integrator = Integrator::empty()
//!     .with_force(Force::spring())
//!     .with_force(Force::noise())
//!     .with_force(Force::pointer_repel())
//!     .with_damping(0.88);
//! ```
//!
//! ### Audio
//!
//! Anything implementing [`AudioSource`] can drive the simulation.
//! [`BassMeter`] analyses real PCM, [`PulseTrack`] fakes a kick drum, and
//! [`Silence`] leaves particles to settle.
//!
//! ## Feature Flags
//!
//! | Flag | Effect |
//! |------|--------|
//! | `parallel` | Integrate particles across threads with rayon |

pub mod audio;
pub mod config;
pub mod error;
pub mod forces;
pub mod input;
pub mod layout;
pub mod noise;
pub mod particle;
pub mod raster;
pub mod sampler;
pub mod simulation;
pub mod source;
pub mod spawn;
pub mod time;

pub use bytemuck;
pub use glam::{Vec2, Vec3};

pub use audio::{AudioSource, BassMeter, PulseTrack, Silence};
pub use config::SimulationConfig;
pub use error::{BuildError, ConfigError, SourceError};
pub use forces::{audio_force, tick, Force, Integrator, TickContext};
pub use input::{Pointer, PointerTracker};
pub use layout::Layout;
pub use particle::{Particle, ParticleField, ParticleInstance, MAX_PARTICLES};
pub use raster::render_frame;
pub use sampler::{build, Sampler};
pub use simulation::{Simulation, StepOutcome};
pub use source::{PixelBuffer, PixelSource};
pub use spawn::SpawnContext;
pub use time::Clock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use pixelbeat::prelude::*;
/// ```
pub mod prelude {
    pub use crate::audio::{AudioSource, BassMeter, PulseTrack, Silence};
    pub use crate::config::SimulationConfig;
    pub use crate::error::{BuildError, ConfigError, SourceError};
    pub use crate::forces::{Force, Integrator};
    pub use crate::input::{Pointer, PointerTracker};
    pub use crate::layout::Layout;
    pub use crate::particle::{Particle, ParticleField, ParticleInstance};
    pub use crate::raster::render_frame;
    pub use crate::simulation::{Simulation, StepOutcome};
    pub use crate::source::{PixelBuffer, PixelSource};
    pub use crate::time::Clock;
    pub use crate::{Vec2, Vec3};
}
