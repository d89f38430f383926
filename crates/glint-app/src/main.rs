use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glint_app::{replay, ReplayError, ReplayOptions, ReplaySummary, Scenario};
use glint_core::GlintConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Replays a scripted mail-list session through the overlay effects.
#[derive(Parser)]
#[command(name = "glint-replay", version, about, long_about = None)]
struct Cli {
    /// Scenario file (TOML)
    #[arg(short, long, value_name = "PATH")]
    scenario: PathBuf,

    /// Effect configuration (TOML); defaults apply when omitted
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Upper bound on simulated 60 fps steps
    #[arg(long, default_value_t = 3600)]
    max_frames: usize,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();
    info!(scenario = %cli.scenario.display(), "glint-replay starting");
    match run(&cli) {
        Ok(summary) => {
            print_summary(&summary, cli.json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("glint-replay error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ReplaySummary, ReplayError> {
    let scenario = Scenario::load(&cli.scenario)?;
    let config = match &cli.config {
        Some(path) => GlintConfig::load(path)?,
        None => GlintConfig::default(),
    };
    let options = ReplayOptions {
        seed: cli.seed,
        max_frames: cli.max_frames,
    };
    Ok(replay(&scenario, &config, options))
}

fn print_summary(summary: &ReplaySummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("glint-replay error: {e}"),
        }
        return;
    }
    println!("frames            {}", summary.frames);
    println!("elapsed           {} ms", summary.elapsed_ms);
    println!("peak particles    {}", summary.peak_particles);
    println!("peak lit pixels   {}", summary.peak_lit_pixels);
    println!(
        "surfaces          {} created, {} removed",
        summary.surfaces_created, summary.surfaces_removed
    );
    println!("final intent      {:?}", summary.final_intent);
    println!(
        "aims              {} fired, {} landed",
        summary.effects.aims_fired, summary.effects.aims_landed
    );
    println!("archive bursts    {}", summary.effects.archive_bursts);
    println!("fuse bursts       {}", summary.effects.fuse_bursts);
    if !summary.completed {
        println!("stopped at the frame cap before the session went idle");
    }
}
