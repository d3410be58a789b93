//! Command line entry point for the Glicko engine
//!
//! Reads registered players and the games of one rating period from a JSON
//! file, processes the period and prints the resulting rating changes as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use glicko_engine::config::AppConfig;
use glicko_engine::rating::{
    Glicko2RatingCalculator, InMemoryRatingStorage, RatingCalculator, RatingEntry, RatingPeriod,
    RatingStorage,
};
use glicko_engine::types::{GameResult, PlayerId, PlayerRating};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Glicko-2 rating period processor
#[derive(Parser)]
#[command(
    name = "glicko-engine",
    version,
    about = "Process one Glicko-2 rating period from a JSON file",
    long_about = "Reads registered players and game results from a JSON file, updates every \
                 participant's rating, deviation and volatility with the Glicko-2 method, and \
                 prints the rating changes as JSON."
)]
struct Args {
    /// Rating period input file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to the rating period input (JSON)"
    )]
    input: Option<PathBuf>,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Glicko settings file, created with defaults when missing
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to Glicko settings (TOML), written with defaults if it does not exist"
    )]
    settings: Option<PathBuf>,

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

    /// Do not decay players without games
    #[arg(long, help = "Leave registered players without games untouched")]
    no_decay: bool,

    /// Dry run mode (validate config and input, then exit)
    #[arg(long, help = "Validate configuration and input and exit without processing")]
    dry_run: bool,
}

/// Rating period input document
#[derive(Debug, Deserialize)]
struct PeriodInput {
    #[serde(default)]
    players: Vec<PlayerInput>,
    #[serde(default)]
    games: Vec<GameResult>,
}

#[derive(Debug, Deserialize)]
struct PlayerInput {
    player_id: PlayerId,
    rating: PlayerRating,
}

#[derive(Debug, Serialize)]
struct PeriodOutput {
    changes: Vec<glicko_engine::RatingChange>,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment, files and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(config_path) => AppConfig::from_file(config_path)?,
        None => AppConfig::from_env()?,
    };

    if let Some(settings_path) = &args.settings {
        config = config.with_settings_file(settings_path)?;
    }

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if args.no_decay {
        config.period.decay_inactive = false;
    }

    glicko_engine::config::validate_config(&config)?;
    Ok(config)
}

fn read_input(path: &Path) -> Result<PeriodInput> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid input {}", path.display()))
}

fn run(config: &AppConfig, input: PeriodInput, dry_run: bool) -> Result<PeriodOutput> {
    let calculator = Glicko2RatingCalculator::new(config.glicko)?;
    let storage = InMemoryRatingStorage::new();

    for player in input.players {
        let rating = calculator
            .rating_from_player(&player.rating)
            .with_context(|| format!("Invalid rating for player {}", player.player_id))?;
        storage.store_rating(RatingEntry::new(player.player_id, rating))?;
    }

    let mut period = RatingPeriod::new().with_decay_inactive(config.period.decay_inactive);
    for game in input.games {
        period.add_result(game)?;
    }

    info!(
        players = storage.get_player_count()?,
        games = period.len(),
        tau = calculator.glicko_config().system_constant,
        "rating period loaded"
    );

    if dry_run {
        info!("Dry run completed - exiting without processing");
        return Ok(PeriodOutput {
            changes: Vec::new(),
        });
    }

    let changes = period.process(&storage, &calculator)?;
    for change in &changes {
        info!(
            "{}: {} -> {} ({:+.0})",
            change.player_id, change.old_rating, change.new_rating, change.delta
        );
    }

    info!(config = %calculator.config(), "rating period processed");
    Ok(PeriodOutput { changes })
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let Some(input_path) = &args.input else {
        if args.settings.is_some() || args.dry_run {
            info!("Configuration validation successful");
            return Ok(());
        }
        error!("No input file given, pass --input FILE");
        std::process::exit(2);
    };

    let input = read_input(input_path)?;
    let output = run(&config, input, args.dry_run)?;

    if !args.dry_run {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
