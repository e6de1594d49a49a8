use thiserror::Error;

use crate::difficulty::ModelConfigError;
use crate::generation::{GenerationError, ProfileError};
use crate::level::{LevelError, ValidationError};

/// Crate-level error used by loaders and binaries
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Level error: {0}")]
    Level(#[from] LevelError),

    #[error("Level failed validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("Difficulty model error: {0}")]
    Model(#[from] ModelConfigError),

    #[error("Generation profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
