//! Command line entry point for glicko-keeper
//!
//! Loads a roster, runs one Glicko-2 rating period over it (or over a
//! single competitor), prints the result and optionally writes the updated
//! roster back out.

use anyhow::{bail, Result};
use clap::Parser;
use glicko_keeper::config::AppConfig;
use glicko_keeper::metrics::MetricsCollector;
use glicko_keeper::rating::{Glicko2Calculator, RatingCalculator};
use glicko_keeper::roster::Roster;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Glicko Keeper - Glicko-2 rating periods for a roster of competitors
#[derive(Parser)]
#[command(
    name = "glicko-keeper",
    version,
    about = "Run a Glicko-2 rating period over a roster of competitors",
    long_about = "Glicko Keeper loads a roster of competitors with their current ratings and \
                 the match results recorded since their last update, applies one Glicko-2 \
                 rating period to every competitor (or a single one), and prints or saves the \
                 updated roster."
)]
struct Args {
    /// Roster file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Roster to load (.json or .toml)"
    )]
    roster: PathBuf,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Update a single competitor
    #[arg(short, long, value_name = "NAME", help = "Only update this competitor")]
    player: Option<String>,

    /// Output file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write the updated roster to this file (.json or .toml)"
    )]
    output: Option<PathBuf>,

    /// Tau override
    #[arg(long, value_name = "TAU", help = "Override the Glicko-2 system constant")]
    tau: Option<f64>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Clear match histories after updating
    #[arg(long, help = "Empty each updated competitor's match history")]
    clear_matches: bool,

    /// Print metrics after the run
    #[arg(long, help = "Print Prometheus metrics after the run")]
    metrics: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(tau) = args.tau {
        config.rating.tau = tau;
    }

    glicko_keeper::config::validate_config(&config)?;
    Ok(config)
}

fn run(args: &Args, config: AppConfig) -> Result<()> {
    let calculator = Arc::new(Glicko2Calculator::new(config.rating)?);
    info!("Rating configuration: {}", calculator.config());

    let metrics = MetricsCollector::new()?;
    let registry = Roster::load(&args.roster)?
        .into_registry(calculator)?
        .with_metrics(metrics.clone());
    let count = registry.len()?;
    info!("Loaded {} competitors from {}", count, args.roster.display());

    let updated: Vec<String> = match &args.player {
        Some(name) => {
            let change = registry.run(name)?;
            info!(
                "{}: {:.0} -> {:.0}",
                name, change.old_rating.rating, change.new_rating.rating
            );
            vec![change.competitor_id]
        }
        None => {
            let report = registry.run_all()?;
            for (id, e) in &report.failures {
                warn!("Skipped {}: {}", id, e);
            }
            report
                .changes
                .into_iter()
                .map(|change| change.competitor_id)
                .collect()
        }
    };

    if args.clear_matches {
        for id in &updated {
            registry.clear_matches(id)?;
        }
    }

    let roster = Roster::from_registry(&registry)?;
    print!("{}", roster.summary());

    if let Some(output) = &args.output {
        if output.exists() {
            bail!("{} already exists; choose a new output file", output.display());
        }
        roster.save(output)?;
        info!("Wrote updated roster to {}", output.display());
    }

    if args.metrics {
        print!("{}", metrics.render()?);
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("{} v{}", config.service.name, glicko_keeper::VERSION);

    if let Err(e) = run(&args, config) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
