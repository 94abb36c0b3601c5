//! Headless pixelbeat runner
//!
//! Samples an image into particles, runs a number of ticks against a
//! synthetic beat (or silence) and writes the final frame as PNG.

use anyhow::{bail, Context, Result};
use clap::Parser;
use pixelbeat::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pixelbeat", version, about = "Audio-reactive image particles")]
struct Cli {
    /// Image to sample (a checkerboard is used when omitted)
    image: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "pixelbeat.png")]
    output: PathBuf,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Load settings from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings to a JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Grid spacing in pixels
    #[arg(long)]
    dot_size: Option<u32>,

    /// Bass multiplier
    #[arg(long)]
    bass_multiplier: Option<f32>,

    /// Noise drift strength
    #[arg(long)]
    chaos: Option<f32>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 120)]
    ticks: u32,

    /// Drive the simulation with a kick drum at this tempo
    #[arg(long)]
    bpm: Option<f32>,

    /// Ticks per second assumed by the beat
    #[arg(long, default_value_t = 60.0)]
    tick_rate: f32,

    /// Fixed pointer position, as X,Y
    #[arg(long, value_delimiter = ',', num_args = 2)]
    pointer: Option<Vec<f32>>,

    /// Seed for reproducible jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SimulationConfig::default(),
        };
        if let Some(dot_size) = self.dot_size {
            config = config.with_dot_size(dot_size);
        }
        if let Some(multiplier) = self.bass_multiplier {
            config = config.with_bass_multiplier(multiplier);
        }
        if let Some(chaos) = self.chaos {
            config = config.with_chaos_strength(chaos);
        }
        config.validate()?;
        Ok(config)
    }

    fn pointer(&self) -> Result<Pointer> {
        match self.pointer.as_deref() {
            None => Ok(Pointer::Absent),
            Some([x, y]) => Ok(Pointer::at(*x, *y)),
            Some(other) => bail!("--pointer expects X,Y, got {} values", other.len()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = cli.simulation_config()?;
    if let Some(path) = &cli.save_config {
        config
            .save(path)
            .with_context(|| format!("failed to save config {}", path.display()))?;
        log::info!("saved config to {}", path.display());
    }

    let image = match &cli.image {
        Some(path) => PixelBuffer::from_file(path)
            .with_context(|| format!("failed to load image {}", path.display()))?,
        None => {
            log::warn!("no image given, using a checkerboard");
            PixelBuffer::checkerboard(256, 32, [230, 90, 40], [40, 90, 230])
        }
    };
    log::info!("loaded {}x{} image", image.width(), image.height());

    let mut sim = Simulation::new(config)
        .with_source(image)
        .with_canvas_size(cli.width as f32, cli.height as f32);
    if let Some(seed) = cli.seed {
        sim = sim.with_seed(seed);
    }
    let mut sim = sim.build()?;

    let mut audio: Box<dyn AudioSource> = match cli.bpm {
        Some(bpm) => Box::new(PulseTrack::new(bpm, cli.tick_rate)),
        None => Box::new(Silence),
    };
    let pointer = cli.pointer()?;

    let mut peak_audio = 0.0f32;
    for _ in 0..cli.ticks {
        match sim.step(audio.as_mut(), pointer) {
            StepOutcome::Advanced { audio_force } => peak_audio = peak_audio.max(audio_force),
            StepOutcome::NothingToRender => {
                log::warn!("nothing to render");
                break;
            }
            StepOutcome::Paused => {}
        }
    }

    log::info!(
        "ran {} ticks over {} particles (step {}), peak audio force {:.2}, max displacement {:.1}px, {:.0} ticks/s",
        sim.clock().tick(),
        sim.particles().len(),
        sim.particles().step(),
        peak_audio,
        sim.particles().max_displacement(),
        sim.clock().fps()
    );

    let frame = render_frame(sim.particles(), sim.last_audio_force(), cli.width, cli.height);
    frame
        .save(&cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    log::info!("wrote {}", cli.output.display());

    Ok(())
}
