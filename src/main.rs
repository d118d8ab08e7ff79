//! loadshape: HTTP load generator with five traffic shapes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use loadshape::loadtest::summary::{render_stress_rounds, render_summary};
use loadshape::{LoadTester, LoadTesterConfig};

/// Send HTTP GET load to an endpoint and report mean latency and errors
#[derive(Parser)]
#[command(name = "loadshape")]
#[command(version)]
struct Cli {
    /// Target URL
    url: String,

    /// Path to a TOML config file
    #[arg(long, env = "LOADSHAPE_CONFIG")]
    config: Option<PathBuf>,

    /// Per-request timeout in milliseconds (overrides config)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a fixed number of sequential requests
    Volume {
        /// Number of requests
        #[arg(long)]
        requests: usize,
    },

    /// Ramp up concurrency until mean latency exceeds a threshold
    ///
    /// Runs until a round's mean response time exceeds the threshold. Without
    /// --max-rounds (or stress_max_rounds in the config) there is no upper
    /// bound on the number of rounds.
    Stress {
        /// Mean latency threshold in seconds
        #[arg(long)]
        threshold: f64,

        /// Concurrency increment per round (overrides config)
        #[arg(long)]
        step: Option<usize>,

        /// Stop after this many rounds even if the threshold is not exceeded
        #[arg(long)]
        max_rounds: Option<u32>,
    },

    /// Send sequential requests for a fixed duration
    Soak {
        /// Test duration in minutes
        #[arg(long)]
        minutes: u64,
    },

    /// Fire repeated bursts of concurrent requests
    Spike {
        /// Number of bursts
        #[arg(long)]
        spikes: usize,

        /// Pause after each burst in seconds (overrides config)
        #[arg(long)]
        delay: Option<f64>,

        /// Requests per burst (overrides config)
        #[arg(long)]
        burst_size: Option<usize>,
    },

    /// Fire one burst of concurrent requests
    Concurrency {
        /// Number of simultaneous requests
        #[arg(long)]
        requests: usize,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Volume { .. } => "volume",
            Commands::Stress { .. } => "stress",
            Commands::Soak { .. } => "soak",
            Commands::Spike { .. } => "spike",
            Commands::Concurrency { .. } => "concurrency",
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(execute(cli))
}

async fn execute(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => LoadTesterConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => LoadTesterConfig::default(),
    };
    apply_overrides(&mut config, &cli);

    let tester = LoadTester::with_config(&cli.url, config)
        .with_context(|| format!("Failed to create load tester for '{}'", cli.url))?;

    let started = Instant::now();
    let analysis = match cli.command {
        Commands::Volume { requests } => tester.volume(requests).await,
        Commands::Stress { threshold, .. } => tester.stress_default(threshold).await,
        Commands::Soak { minutes } => tester.soak(minutes).await,
        Commands::Spike { spikes, .. } => tester.spike_default(spikes).await,
        Commands::Concurrency { requests } => tester.concurrency(requests).await,
    }
    .with_context(|| format!("{} test failed", cli.command.name()))?;

    println!(
        "{}",
        render_summary(&analysis, cli.command.name(), tester.target(), started.elapsed())
    );
    if let Commands::Stress { threshold, .. } = cli.command {
        println!("{}", render_stress_rounds(&tester.stress_rounds(), threshold));
    }

    Ok(())
}

/// Apply CLI flag overrides to a loaded config.
fn apply_overrides(config: &mut LoadTesterConfig, cli: &Cli) {
    let settings = &mut config.settings;
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    match &cli.command {
        Commands::Stress {
            step, max_rounds, ..
        } => {
            if let Some(step) = step {
                settings.stress_step = *step;
            }
            if max_rounds.is_some() {
                settings.stress_max_rounds = *max_rounds;
            }
        },
        Commands::Spike {
            delay, burst_size, ..
        } => {
            if let Some(delay) = delay {
                settings.spike_delay_secs = *delay;
            }
            if let Some(burst_size) = burst_size {
                settings.spike_burst_size = *burst_size;
            }
        },
        _ => {},
    }
}

/// Initialize logging: `RUST_LOG` if set, otherwise `info`, written to stderr.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
