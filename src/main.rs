use anyhow::Result;
use clap::Parser;
use spectro_replay::config::ReplayConfig;
use spectro_replay::dataset::Dataset;
use spectro_replay::engine::{self, ReplayScheduler};
use spectro_replay::tick::IntervalTicker;
use std::path::PathBuf;
use tokio::time::Duration;

#[derive(Parser)]
#[command(name = "spectro-replay")]
#[command(about = "Replay a recorded spectrogram dataset into scrolling chart sinks")]
#[command(version)]
struct Cli {
    /// JSON dataset with one array of frames per channel
    #[arg(long)]
    dataset: PathBuf,

    /// Replay config (defaults reproduce the two-channel demo)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many seconds (0 = run until Ctrl-C)
    #[arg(long, default_value = "0")]
    seconds: u64,

    /// Override the replayed sample rate in Hz
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Override the display refresh rate in Hz
    #[arg(long)]
    refresh_hz: Option<f64>,

    /// Override the per-tick frame ceiling
    #[arg(long)]
    max_per_tick: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ReplayConfig::load(path)?,
        None => ReplayConfig::default(),
    };
    if let Some(rate) = cli.sample_rate {
        config.sample_rate_hz = rate;
    }
    if let Some(rate) = cli.refresh_hz {
        config.refresh_hz = rate;
    }
    if let Some(max) = cli.max_per_tick {
        config.max_per_tick = max;
    }
    config.validate()?;

    // Nothing ticks until the dataset is fully loaded
    let dataset = Dataset::load(&cli.dataset).await?;
    let scheduler = ReplayScheduler::from_config(&config, &dataset)?;
    let ticker = IntervalTicker::new(config.refresh_hz)?;

    let handle = engine::spawn(scheduler, ticker)?;

    if cli.seconds == 0 {
        tokio::signal::ctrl_c().await?;
    } else {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(cli.seconds)) => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    }

    let scheduler = handle.stop().await?;
    println!("{}", scheduler.get_monitor().generate_report());

    for (channel, sink) in scheduler.into_sinks() {
        log::debug!("Releasing {} sink for {}", sink.kind(), channel);
    }

    Ok(())
}
