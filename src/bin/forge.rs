//! Forge CLI
//!
//! Certifies level files (solvability + difficulty) and generates new levels,
//! printing JSON to stdout.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use timecube_forge::core::error::{ForgeError, Result};
use timecube_forge::core::types::BoardGeometry;
use timecube_forge::difficulty::{evaluate_difficulty, DifficultyModelConfig, DifficultyTier};
use timecube_forge::generation::{generate_level, GenerationProfile, GenerationRequest};
use timecube_forge::level::{LevelRecord, LevelValidator, StructuralValidator};

#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(about = "Certify and generate time-rift puzzle levels")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a level, search it and score its difficulty
    Certify {
        /// Level file (.json or .toml)
        level: PathBuf,

        /// Difficulty model (defaults to the built-in model)
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Generate a solvable level
    Generate {
        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, default_value_t = 8)]
        width: i32,

        #[arg(long, default_value_t = 8)]
        height: i32,

        #[arg(long, default_value_t = 12)]
        time_depth: i32,

        /// easy, normal, hard or expert
        #[arg(long, default_value = "normal")]
        difficulty: String,

        #[arg(long, default_value_t = 32)]
        max_attempts: u32,

        #[arg(long, default_value_t = 0.0)]
        quality_threshold: f64,

        /// Generation profile (defaults to the built-in profile)
        #[arg(long)]
        profile: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("timecube_forge=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let output = match args.command {
        Command::Certify { level, model } => certify(level, model)?,
        Command::Generate {
            seed,
            width,
            height,
            time_depth,
            difficulty,
            max_attempts,
            quality_threshold,
            profile,
        } => {
            let profile = match profile {
                Some(path) => GenerationProfile::load(&path)?,
                None => GenerationProfile::default(),
            };
            let request = GenerationRequest::new(
                seed,
                BoardGeometry::new(width, height, time_depth),
                parse_tier(&difficulty)?,
            )
            .with_max_attempts(max_attempts)
            .with_quality_threshold(quality_threshold);
            serde_json::to_string_pretty(&generate_level(&request, &profile)?)?
        }
    };

    println!("{}", output);
    Ok(())
}

fn certify(level_path: PathBuf, model_path: Option<PathBuf>) -> Result<String> {
    let level = LevelRecord::load(&level_path)?;
    StructuralValidator::new().validate(&level)?;

    let model = match model_path {
        Some(path) => DifficultyModelConfig::load(&path)?,
        None => DifficultyModelConfig::default(),
    };
    tracing::info!("Certifying {} with model {}", level.id, model.model_version);

    let evaluation = evaluate_difficulty(&level, &model, None);
    Ok(serde_json::to_string_pretty(&evaluation)?)
}

fn parse_tier(name: &str) -> Result<DifficultyTier> {
    DifficultyTier::ALL
        .into_iter()
        .find(|tier| tier.to_string() == name.to_ascii_lowercase())
        .ok_or_else(|| ForgeError::Config(format!("unknown difficulty tier '{}'", name)))
}
