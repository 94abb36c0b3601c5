//! Tick counting for the simulation driver.
//!
//! The integrator is driven by a monotonic tick counter rather than wall
//! time, so the same sequence of inputs always produces the same motion.
//! [`Clock`] owns that counter and adds pause support and an FPS estimate for
//! diagnostics.
//!
//! # Example
//!
//! ```ignore
//! use pixelbeat::time::Clock;
//!
//! let mut clock = Clock::new();
//!
//! // In your frame loop:
//! if !clock.is_paused() {
//!     integrator.tick(&mut field, bass, pointer, clock.tick(), &config);
//!     clock.advance();
//! }
//! ```

use crate::forces::noise_time;
use std::time::{Duration, Instant};

/// Tick counter with pause and FPS tracking.
#[derive(Debug)]
pub struct Clock {
    /// Ticks completed since start or last reset.
    ticks: u64,
    /// Whether ticking is suspended.
    paused: bool,
    /// Calculated ticks per second (updated periodically).
    fps: f32,
    /// Tick count at last FPS update.
    fps_ticks: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update the FPS calculation.
    fps_update_interval: Duration,
}

impl Clock {
    /// Create a clock at tick zero.
    pub fn new() -> Self {
        Self {
            ticks: 0,
            paused: false,
            fps: 0.0,
            fps_ticks: 0,
            fps_update_time: Instant::now(),
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Ticks completed so far. This is the value to pass to the integrator
    /// for the next tick.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.ticks
    }

    /// Noise time for the next tick.
    #[inline]
    pub fn noise_time(&self) -> f32 {
        noise_time(self.ticks)
    }

    /// Record one completed tick. Ignored while paused.
    ///
    /// Returns whether the counter moved.
    pub fn advance(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.ticks += 1;

        let now = Instant::now();
        let since = now.duration_since(self.fps_update_time);
        if since >= self.fps_update_interval {
            self.fps = (self.ticks - self.fps_ticks) as f32 / since.as_secs_f32();
            self.fps_ticks = self.ticks;
            self.fps_update_time = now;
        }
        true
    }

    /// Measured ticks per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.fps_ticks = self.ticks;
            self.fps_update_time = Instant::now();
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Back to tick zero, running.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
