use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use driftwave_core::{AppConfig, Engine, PreviewLayer, SoundProfile, SystemClock, TickOutcome};
use tracing_subscriber::EnvFilter;

mod graph;
mod input;

use graph::LoggingBackend;
use input::SimulatedInput;

fn main() -> driftwave_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Play {
            profile,
            pro,
            time_scale,
            interact_every,
            volume,
        } => run_play(
            &config,
            &profile,
            PlayOptions {
                pro,
                time_scale,
                interact_every,
                volume,
            },
        ),
        Commands::Check { profile } => run_check(&profile),
        Commands::Preview { layer, value } => run_preview(&config, &layer, value),
    }
}

struct PlayOptions {
    pro: bool,
    time_scale: f64,
    interact_every: Option<f64>,
    volume: Option<f64>,
}

fn run_play(config: &AppConfig, path: &Path, options: PlayOptions) -> driftwave_core::Result<()> {
    let profile = Arc::new(SoundProfile::from_path(path)?);
    tracing::info!(id = %profile.id, time_scale = options.time_scale, "starting session");

    let clock = Arc::new(SystemClock::scaled(options.time_scale));
    let mut engine = Engine::new(config.engine.clone(), &LoggingBackend, clock.clone())?;
    if let Some(volume) = options.volume {
        engine.set_master_volume(volume);
    }
    engine.set_pro_mode(options.pro)?;
    engine.load_profile(profile);
    engine.play();

    let input = options.interact_every.map(|every| {
        let handle = engine.interaction_handle();
        let pause = Duration::from_secs_f64((every / clock.rate()).max(0.001));
        SimulatedInput::spawn(pause, move || {
            if let Err(err) = handle.record() {
                tracing::warn!(%err, "dropping simulated interaction");
            }
        })
    });

    let interval = config.frame.frame_interval();
    let mut next_report = 0.1;
    let result = loop {
        match engine.frame() {
            TickOutcome::Completed(event) => break Some(event),
            TickOutcome::Idle => break None,
            TickOutcome::Updated(targets) => {
                if targets.progress >= next_report {
                    let progress = engine.progress();
                    tracing::info!(
                        elapsed = progress.elapsed_seconds,
                        remaining = progress.remaining_seconds,
                        pitch_hz = targets.oscillator_hz(),
                        cutoff_hz = targets.cutoff_hz,
                        gate = targets.gate,
                        "progress"
                    );
                    next_report += 0.1;
                }
            }
        }
        std::thread::sleep(interval);
    };

    if let Some(event) = result {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    if let Some(input) = input {
        input.stop();
    }
    Ok(())
}

fn run_check(path: &Path) -> driftwave_core::Result<()> {
    let profile = SoundProfile::from_path(path)?;
    println!("{}", serde_json::to_string_pretty(&profile.summary())?);
    Ok(())
}

fn run_preview(config: &AppConfig, layer: &str, value: f64) -> driftwave_core::Result<()> {
    let layer: PreviewLayer = layer.parse()?;
    let mut engine = Engine::new(
        config.engine.clone(),
        &LoggingBackend,
        Arc::new(SystemClock::new()),
    )?;

    engine.preview_layer(layer, value);
    let interval = config.frame.frame_interval();
    while engine.is_previewing() {
        engine.frame();
        std::thread::sleep(interval);
    }
    tracing::info!(?layer, value, "preview finished");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Adaptive ambient tone sessions", long_about = None)]
struct Cli {
    /// Optional JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a session from a profile file until it completes.
    Play {
        /// Path to the profile JSON.
        profile: PathBuf,
        /// Enable Pro Mode adaptation.
        #[arg(long)]
        pro: bool,
        /// Run the session clock this many times faster than real time.
        #[arg(long, default_value_t = 1.0)]
        time_scale: f64,
        /// Simulate an interaction every N session seconds.
        #[arg(long)]
        interact_every: Option<f64>,
        /// Master volume in [0, 1].
        #[arg(long)]
        volume: Option<f64>,
    },
    /// Validate a profile and print a summary.
    Check {
        /// Path to the profile JSON.
        profile: PathBuf,
    },
    /// Audition a single layer value for a moment.
    Preview {
        /// One of `frequency`, `texture`, `density`.
        layer: String,
        /// Perceptual value in [0, 1].
        value: f64,
    },
}
