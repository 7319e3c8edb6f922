#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the double-slit experiment headlessly.

mod report;
mod run_file;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueHint};
use double_slit_core::{Event, ParameterName};
use double_slit_engine::Engine;
use tracing::info;
use tracing_subscriber::EnvFilter;

use run_file::RunFile;

/// Command-line arguments accepted by the double-slit harness.
#[derive(Debug, Parser)]
#[command(
    name = "double-slit",
    version,
    about = "Fires particles through a double slit and reports the detection statistics"
)]
struct CliArgs {
    /// TOML run file with optional `[engine]` and `[parameters]` tables.
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 3_600)]
    frames: u32,

    /// Frames per simulated second.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Seed for the random source; overrides the run file.
    #[arg(long)]
    seed: Option<u64>,

    /// Wavelength in nanometres.
    #[arg(long)]
    wavelength: Option<f64>,

    /// Centre-to-centre slit distance in millimetres.
    #[arg(long)]
    slit_distance: Option<f64>,

    /// Slit width in millimetres.
    #[arg(long)]
    slit_width: Option<f64>,

    /// Barrier thickness in millimetres.
    #[arg(long)]
    barrier_thickness: Option<f64>,

    /// Coherence as a fraction between 0 and 1.
    #[arg(long)]
    coherence: Option<f64>,

    /// Gaussian half-width of the source beam.
    #[arg(long)]
    beam_width: Option<f64>,

    /// Distance from the barrier to the screen.
    #[arg(long)]
    screen_distance: Option<f64>,

    /// Expected particle emissions per second.
    #[arg(long)]
    intensity: Option<f64>,

    /// Probability that a particle passes the barrier.
    #[arg(long)]
    transmission: Option<f64>,

    /// Switch the which-path detector on.
    #[arg(long)]
    detector: bool,

    /// Clamp out-of-range parameters into range instead of refusing them.
    #[arg(long)]
    clamp: bool,

    /// Width of the longest histogram bar in characters.
    #[arg(long, default_value_t = 60)]
    bar_width: usize,
}

impl CliArgs {
    fn parameter_overrides(&self) -> Vec<(ParameterName, f64)> {
        [
            (ParameterName::Wavelength, self.wavelength),
            (ParameterName::SlitDistance, self.slit_distance),
            (ParameterName::SlitWidth, self.slit_width),
            (ParameterName::BarrierThickness, self.barrier_thickness),
            (ParameterName::Coherence, self.coherence),
            (ParameterName::BeamWidth, self.beam_width),
            (ParameterName::ScreenDistance, self.screen_distance),
            (ParameterName::SourceIntensity, self.intensity),
            (ParameterName::TransmissionEfficiency, self.transmission),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect()
    }

    fn frame_duration(&self) -> Result<Duration> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            bail!("--fps must be a positive number, got {}", self.fps);
        }
        Duration::try_from_secs_f64(1.0 / self.fps)
            .with_context(|| format!("--fps {} yields no usable frame duration", self.fps))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Entry point for the double-slit command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();
    let frame = args.frame_duration()?;

    let RunFile {
        mut engine,
        mut parameters,
    } = RunFile::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        engine.seed = seed;
    }
    for (name, value) in args.parameter_overrides() {
        parameters.set_value(name, value);
    }
    if args.detector {
        parameters.detector_active = true;
    }
    if args.clamp {
        parameters = parameters.sanitized();
    }

    let mut simulation =
        Engine::new(engine, parameters).context("failed to start the double-slit engine")?;

    let mut hits = 0_u64;
    for _ in 0..args.frames {
        hits += simulation
            .tick(frame)
            .iter()
            .filter(|event| matches!(event, Event::ParticleHit { .. }))
            .count() as u64;
    }
    info!(
        frames = args.frames,
        simulated_seconds = frame.as_secs_f64() * f64::from(args.frames),
        hits,
        "run complete"
    );

    let readout = report::render(&simulation.snapshot(), &simulation.counters(), args.bar_width)
        .context("failed to format the statistics readout")?;
    print!("{readout}");
    Ok(())
}
