//! Difficulty scoring built on the solvability search

pub mod evaluate;
pub mod model;

pub use evaluate::{
    evaluate_difficulty, DifficultyDimensions, DifficultyEvaluation, DifficultyVector, RawMetrics,
};
pub use model::{
    DifficultyModelConfig, DifficultyTier, ModelConfigError, NormalizationRange,
    NormalizationRanges, ScoreWeights, TierBound,
};
