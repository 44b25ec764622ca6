//! Heist simulation CLI.
//!
//! Prints one `BUSY` / `FREE` / `EMPTY` line per appraisal on stdout, then the
//! final report. Logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use heist::config::{
    DEFAULT_CANVASES, DEFAULT_ORDINARY_THIEVES, DEFAULT_PARTY_SIZE, DEFAULT_ROOMS,
};
use heist::logging::{self, LogConfig};
use heist::{ConsoleReporter, Heist, HeistConfig, RoomPlan};

#[derive(Parser)]
#[command(name = "heist")]
#[command(version)]
#[command(about = "Concurrent museum heist simulation")]
struct Cli {
    /// Number of ordinary thieves
    #[arg(short = 'o', long = "ordinary", default_value_t = DEFAULT_ORDINARY_THIEVES)]
    ordinary: usize,

    /// Seats per assault party
    #[arg(long, default_value_t = DEFAULT_PARTY_SIZE)]
    party_size: usize,

    /// Number of rooms with a random canvas count
    #[arg(long, default_value_t = DEFAULT_ROOMS)]
    rooms: usize,

    /// Explicit canvas count per room (comma-separated); overrides --rooms
    #[arg(long, value_delimiter = ',')]
    canvases: Vec<u32>,

    /// Success probability of an attempt on a full room
    #[arg(long, default_value_t = 0.8)]
    success_probability: f64,

    /// Random seed
    #[arg(long, env = "HEIST_SEED")]
    seed: Option<u64>,

    /// Print the run summary as JSON after the report
    #[arg(long)]
    summary_json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Also append logs to this file
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: if cli.verbose { Level::DEBUG } else { Level::WARN },
        json_format: cli.json_logs,
        ..Default::default()
    };
    match &cli.log_file {
        Some(path) => logging::init_with_file(log_config, path)
            .with_context(|| format!("cannot open log file {}", path))?,
        None => logging::init(log_config),
    }

    let rooms = if cli.canvases.is_empty() {
        RoomPlan::Random {
            count: cli.rooms,
            canvases: DEFAULT_CANVASES,
        }
    } else {
        RoomPlan::Fixed(cli.canvases.clone())
    };

    let mut config = HeistConfig::default()
        .with_ordinary_thieves(cli.ordinary)
        .with_party_size(cli.party_size)
        .with_rooms(rooms)
        .with_success_probability(cli.success_probability);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    tracing::info!(
        ordinary_thieves = config.ordinary_thieves,
        assault_parties = config.assault_parties(),
        "starting program"
    );

    let heist = Heist::new(config, Arc::new(ConsoleReporter)).context("invalid heist configuration")?;
    let summary = heist.run().context("heist failed")?;

    if cli.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
