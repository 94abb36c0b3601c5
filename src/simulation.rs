//! Simulation driver.
//!
//! [`Simulation`] owns everything that lives between structural changes: the
//! source image, canvas size, configuration, the particle field and the tick
//! clock. Use method chaining to configure it, then call
//! [`Simulation::step`] once per frame.
//!
//! Rebuilds are atomic: a new field is fully sampled before it replaces the
//! old one, and a failed rebuild leaves the previous field in place.

use crate::audio::{sample_amplitude, AudioSource};
use crate::config::SimulationConfig;
use crate::error::BuildError;
use crate::forces::{Integrator, TickContext};
use crate::input::Pointer;
use crate::layout::Layout;
use crate::particle::ParticleField;
use crate::sampler::Sampler;
use crate::source::PixelSource;
use crate::time::Clock;

/// What happened on a call to [`Simulation::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// One tick ran. Carries the audio force used, for rendering.
    Advanced { audio_force: f32 },
    /// The clock is paused; particles did not move.
    Paused,
    /// No image is loaded (or it is empty); nothing to draw.
    NothingToRender,
}

/// An image-sampled particle simulation.
pub struct Simulation<S: PixelSource> {
    source: Option<S>,
    canvas_width: f32,
    canvas_height: f32,
    config: SimulationConfig,
    sampler: Sampler,
    integrator: Integrator,
    field: ParticleField,
    clock: Clock,
    last_audio_force: f32,
}

impl<S: PixelSource> Simulation<S> {
    /// Create a simulation with no image and a 1280x720 canvas.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            source: None,
            canvas_width: 1280.0,
            canvas_height: 720.0,
            config,
            sampler: Sampler::new(),
            integrator: Integrator::default(),
            field: ParticleField::default(),
            clock: Clock::new(),
            last_audio_force: 0.0,
        }
    }

    /// Set the source image.
    pub fn with_source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the canvas size in pixels.
    pub fn with_canvas_size(mut self, width: f32, height: f32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    /// Fix the jitter seed so rebuilds are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.sampler = self.sampler.with_seed(seed);
        self
    }

    /// Replace the force integrator.
    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }

    /// Sample the current source into a fresh field and swap it in.
    pub fn rebuild(&mut self) -> Result<(), BuildError> {
        let (field, layout) = self.sampler.build(
            self.source.as_ref(),
            self.canvas_width,
            self.canvas_height,
            self.config.dot_size,
        )?;

        if field.is_empty() {
            log::warn!(
                "no particles built for {}x{} canvas: image missing or empty",
                self.canvas_width,
                self.canvas_height
            );
        } else {
            log::info!(
                "built {} particles at step {} (dot size {}), image at {:?} size {:?}",
                field.len(),
                field.step(),
                self.config.dot_size,
                layout.origin,
                layout.size
            );
        }

        self.field = field;
        Ok(())
    }

    /// Finish configuration and build the first field.
    pub fn build(mut self) -> Result<Self, BuildError> {
        self.rebuild()?;
        Ok(self)
    }

    /// Replace the image and rebuild.
    pub fn set_source(&mut self, source: S) -> Result<(), BuildError> {
        self.source = Some(source);
        self.rebuild()
    }

    /// Drop the image. The field becomes empty.
    pub fn clear_source(&mut self) {
        self.source = None;
        self.field = ParticleField::default();
        log::info!("image cleared");
    }

    /// Change canvas size and rebuild.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), BuildError> {
        let (old_w, old_h) = (self.canvas_width, self.canvas_height);
        self.canvas_width = width;
        self.canvas_height = height;
        self.rebuild().inspect_err(|_| {
            self.canvas_width = old_w;
            self.canvas_height = old_h;
        })
    }

    /// Change dot size and rebuild.
    pub fn set_dot_size(&mut self, dot_size: u32) -> Result<(), BuildError> {
        let config = self.config.with_dot_size(dot_size);
        self.set_config(config)
    }

    /// Takes effect on the next tick.
    pub fn set_bass_multiplier(&mut self, multiplier: f32) {
        self.config.bass_multiplier = multiplier;
    }

    /// Takes effect on the next tick.
    pub fn set_chaos_strength(&mut self, strength: f32) {
        self.config.chaos_strength = strength;
    }

    /// Apply a whole configuration, rebuilding only if the dot size changed.
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), BuildError> {
        if !self.config.needs_rebuild(&config) {
            self.config = config;
            return Ok(());
        }
        if config.dot_size == 0 {
            return Err(BuildError::InvalidDotSize(config.dot_size));
        }
        let previous = self.config;
        self.config = config;
        self.rebuild().inspect_err(|_| self.config = previous)
    }

    /// Run one tick.
    ///
    /// Reads bass energy from `audio` (zero when it is not playing) and
    /// advances every particle.
    pub fn step(&mut self, audio: &mut dyn AudioSource, pointer: Pointer) -> StepOutcome {
        if self.field.is_empty() {
            return StepOutcome::NothingToRender;
        }
        if self.clock.is_paused() {
            return StepOutcome::Paused;
        }

        let amplitude = sample_amplitude(audio);
        let ctx = TickContext::new(amplitude, pointer, self.clock.tick(), &self.config);
        self.integrator.tick_with(&mut self.field, &ctx);
        self.clock.advance();
        self.last_audio_force = ctx.audio_force;

        StepOutcome::Advanced {
            audio_force: ctx.audio_force,
        }
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    pub fn toggle_pause(&mut self) {
        self.clock.toggle_pause();
    }

    /// Current particle field.
    pub fn particles(&self) -> &ParticleField {
        &self.field
    }

    /// Layout of the current field.
    pub fn layout(&self) -> Layout {
        self.field.layout()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        (self.canvas_width, self.canvas_height)
    }

    /// Audio force applied on the most recent tick.
    pub fn last_audio_force(&self) -> f32 {
        self.last_audio_force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{PulseTrack, Silence};
    use crate::source::PixelBuffer;

    fn sim() -> Simulation<PixelBuffer> {
        Simulation::new(SimulationConfig::default())
            .with_source(PixelBuffer::checkerboard(16, 4, [250, 20, 20], [20, 20, 250]))
            .with_canvas_size(200.0, 100.0)
            .with_seed(9)
            .build()
            .unwrap()
    }

    #[test]
    fn test_no_source_nothing_to_render() {
        let mut sim = Simulation::<PixelBuffer>::new(SimulationConfig::default()).build().unwrap();
        assert!(sim.particles().is_empty());
        assert_eq!(sim.step(&mut Silence, Pointer::Absent), StepOutcome::NothingToRender);
        assert_eq!(sim.clock().tick(), 0);
    }

    #[test]
    fn test_step_advances_clock() {
        let mut sim = sim();
        assert!(!sim.particles().is_empty());
        let outcome = sim.step(&mut Silence, Pointer::Absent);
        assert_eq!(outcome, StepOutcome::Advanced { audio_force: 0.0 });
        assert_eq!(sim.clock().tick(), 1);
    }

    #[test]
    fn test_pause_freezes_particles() {
        let mut sim = sim();
        sim.pause();
        let before = sim.particles().clone();
        assert_eq!(sim.step(&mut Silence, Pointer::Absent), StepOutcome::Paused);
        assert_eq!(sim.particles(), &before);
        sim.toggle_pause();
        assert!(matches!(sim.step(&mut Silence, Pointer::Absent), StepOutcome::Advanced { .. }));
    }

    #[test]
    fn test_audio_reaches_integrator() {
        let mut sim = sim();
        let mut pulse = PulseTrack::new(120.0, 60.0);
        match sim.step(&mut pulse, Pointer::Absent) {
            StepOutcome::Advanced { audio_force } => assert!((audio_force - 2.2).abs() < 1e-5),
            other => panic!("unexpected {:?}", other),
        }
        assert!((sim.last_audio_force() - 2.2).abs() < 1e-5);
    }

    #[test]
    fn test_dot_size_change_rebuilds() {
        let mut sim = sim();
        let before = sim.particles().len();
        sim.set_dot_size(8).unwrap();
        assert_eq!(sim.config().dot_size, 8);
        // 25x25 cells at step 8 would exceed the budget
        assert_eq!(sim.particles().step(), 10);
        assert!(sim.particles().len() > before);
    }

    #[test]
    fn test_live_settings_do_not_rebuild() {
        let mut sim = sim();
        sim.step(&mut Silence, Pointer::Absent);
        let before = sim.particles().clone();
        sim.set_chaos_strength(7.0);
        sim.set_bass_multiplier(3.0);
        sim.set_config(sim.config().with_chaos_strength(1.0)).unwrap();
        assert_eq!(sim.particles(), &before);
        assert_eq!(sim.config().bass_multiplier, 3.0);
    }

    #[test]
    fn test_invalid_dot_size_keeps_field() {
        let mut sim = sim();
        let before = sim.particles().clone();
        assert_eq!(sim.set_dot_size(0), Err(BuildError::InvalidDotSize(0)));
        assert_eq!(sim.particles(), &before);
        assert_eq!(sim.config().dot_size, 16);
    }

    #[test]
    fn test_resize_rebuilds_layout() {
        let mut sim = sim();
        sim.resize(100.0, 200.0).unwrap();
        assert_eq!(sim.layout().size.y, 200.0);
        assert!(sim.resize(f32::INFINITY, 1.0).is_err());
        assert_eq!(sim.canvas_size(), (100.0, 200.0));
    }

    #[test]
    fn test_clear_source() {
        let mut sim = sim();
        sim.clear_source();
        assert!(sim.particles().is_empty());
        assert_eq!(sim.step(&mut Silence, Pointer::Absent), StepOutcome::NothingToRender);
    }
}
