//! Bass energy providers.
//!
//! The integrator needs one scalar per tick: low-frequency energy on a
//! nominal 0-255 scale. Anything implementing [`AudioSource`] can supply it.
//! A source that is not playing contributes nothing.
//!
//! - [`Silence`] - always zero
//! - [`PulseTrack`] - synthetic kick drum at a fixed tempo
//! - [`BassMeter`] - FFT analysis of live PCM windows

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Supplies bass energy to the simulation once per tick.
pub trait AudioSource {
    /// Whether a track is loaded and currently playing.
    fn is_playing(&self) -> bool;

    /// Bass energy for this tick, 0-255 nominal.
    fn bass_energy(&mut self) -> f32;
}

/// Read this tick's amplitude from `source`.
///
/// Returns 0 when the source is not playing or reports a non-finite or
/// negative value.
pub fn sample_amplitude(source: &mut dyn AudioSource) -> f32 {
    if !source.is_playing() {
        return 0.0;
    }
    let energy = source.bass_energy();
    if energy.is_finite() {
        energy.max(0.0)
    } else {
        0.0
    }
}

/// No audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silence;

impl AudioSource for Silence {
    fn is_playing(&self) -> bool {
        false
    }

    fn bass_energy(&mut self) -> f32 {
        0.0
    }
}

/// Kick drum envelope at a fixed tempo.
///
/// Energy jumps to `peak` on every beat and decays exponentially until the
/// next one. Each call to [`AudioSource::bass_energy`] advances one tick.
#[derive(Debug, Clone)]
pub struct PulseTrack {
    bpm: f32,
    tick_rate: f32,
    decay: f32,
    peak: f32,
    tick: u64,
    playing: bool,
}

impl PulseTrack {
    /// Pulse at `bpm` for a driver running `tick_rate` ticks per second.
    pub fn new(bpm: f32, tick_rate: f32) -> Self {
        Self {
            bpm: bpm.max(1.0),
            tick_rate: tick_rate.max(1.0),
            decay: 0.85,
            peak: 255.0,
            tick: 0,
            playing: true,
        }
    }

    /// Fraction of energy kept per tick after a beat.
    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = decay.clamp(0.0, 1.0);
        self
    }

    /// Energy at the beat.
    pub fn with_peak(mut self, peak: f32) -> Self {
        self.peak = peak.max(0.0);
        self
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Ticks between beats.
    pub fn beat_period(&self) -> f32 {
        self.tick_rate * 60.0 / self.bpm
    }

    /// Energy at a given tick, without advancing.
    pub fn energy_at(&self, tick: u64) -> f32 {
        let phase = (tick as f32) % self.beat_period();
        self.peak * self.decay.powf(phase.floor())
    }
}

impl AudioSource for PulseTrack {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn bass_energy(&mut self) -> f32 {
        let energy = self.energy_at(self.tick);
        self.tick += 1;
        energy
    }
}

/// Bass band edges in Hz.
pub const BASS_LOW_HZ: f32 = 20.0;
pub const BASS_HIGH_HZ: f32 = 140.0;

/// Byte-scale mapping range in decibels.
pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

/// Temporal smoothing between successive windows.
pub const SMOOTHING: f32 = 0.8;

/// Default analysis window in samples.
pub const FFT_SIZE: usize = 2048;

/// FFT-based bass energy analyser for mono PCM.
///
/// Feed it the most recent samples once per tick with
/// [`BassMeter::process`]; [`AudioSource::bass_energy`] then returns the mean
/// byte-scaled magnitude of the bins between [`BASS_LOW_HZ`] and
/// [`BASS_HIGH_HZ`].
pub struct BassMeter {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    sample_rate: u32,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
    energy: f32,
    playing: bool,
}

impl BassMeter {
    /// Analyser with a [`FFT_SIZE`] window.
    pub fn new(sample_rate: u32) -> Self {
        Self::with_fft_size(sample_rate, FFT_SIZE)
    }

    /// Analyser with a custom window size (rounded up to a power of two, min 32).
    pub fn with_fft_size(sample_rate: u32, fft_size: usize) -> Self {
        let fft_size = fft_size.max(32).next_power_of_two();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Blackman window
        let window = (0..fft_size)
            .map(|i| {
                let x = 2.0 * PI * i as f32 / fft_size as f32;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        Self {
            fft,
            fft_size,
            sample_rate: sample_rate.max(1),
            window,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
            bytes: vec![0; fft_size / 2],
            energy: 0.0,
            playing: true,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Byte-scaled spectrum from the last [`BassMeter::process`] call.
    pub fn spectrum(&self) -> &[u8] {
        &self.bytes
    }

    /// Bin index range covering `low_hz..=high_hz`.
    pub fn band_bins(&self, low_hz: f32, high_hz: f32) -> (usize, usize) {
        let bins = self.fft_size / 2;
        let nyquist = self.sample_rate as f32 / 2.0;
        let to_bin = |hz: f32| ((hz / nyquist * bins as f32).round() as usize).min(bins - 1);
        let (lo, hi) = (to_bin(low_hz), to_bin(high_hz));
        (lo.min(hi), lo.max(hi))
    }

    /// Mean byte magnitude in a frequency band.
    pub fn band_energy(&self, low_hz: f32, high_hz: f32) -> f32 {
        let (lo, hi) = self.band_bins(low_hz, high_hz);
        let band = &self.bytes[lo..=hi];
        band.iter().map(|&b| b as f32).sum::<f32>() / band.len() as f32
    }

    /// Analyse the latest window of samples.
    ///
    /// Uses the last `fft_size` samples; shorter input is zero-padded at the
    /// front. Returns the new bass energy.
    pub fn process(&mut self, samples: &[f32]) -> f32 {
        let take = samples.len().min(self.fft_size);
        let offset = self.fft_size - take;
        let recent = &samples[samples.len() - take..];

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < offset { 0.0 } else { recent[i - offset] };
            let sample = if sample.is_finite() { sample } else { 0.0 };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let range = MAX_DECIBELS - MIN_DECIBELS;
        for k in 0..self.fft_size / 2 {
            let magnitude = self.buffer[k].norm() / self.fft_size as f32;
            self.smoothed[k] = SMOOTHING * self.smoothed[k] + (1.0 - SMOOTHING) * magnitude;
            let db = 20.0 * self.smoothed[k].log10();
            self.bytes[k] = (255.0 * (db - MIN_DECIBELS) / range).clamp(0.0, 255.0) as u8;
        }

        self.energy = self.band_energy(BASS_LOW_HZ, BASS_HIGH_HZ);
        self.energy
    }

    /// Forget previous windows.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
        self.bytes.iter_mut().for_each(|v| *v = 0);
        self.energy = 0.0;
    }
}

impl AudioSource for BassMeter {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn bass_energy(&mut self) -> f32 {
        self.energy
    }
}
