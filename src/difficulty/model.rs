//! Difficulty-model configuration
//!
//! A fixed, auditable weighted formula: every constant the evaluator uses
//! lives here and is loaded from `data/difficulty_model.toml`.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::solver::options::SolverOptions;

/// Tolerance for "weights sum to one"
const WEIGHT_EPSILON: f64 = 1e-6;

#[derive(Error, Debug)]
pub enum ModelConfigError {
    #[error("Normalization range for {metric} must have max > min (got {min}..{max})")]
    InvalidRange {
        metric: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Weight {name} must be non-negative (got {value})")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("{group} weights must sum to 1 (got {sum})")]
    WeightSum { group: &'static str, sum: f64 },

    #[error("Invalid tier table: {0}")]
    InvalidTiers(String),

    #[error("Invalid solver options: {0}")]
    InvalidSolver(String),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Normal,
    Hard,
    Expert,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 4] = [
        DifficultyTier::Easy,
        DifficultyTier::Normal,
        DifficultyTier::Hard,
        DifficultyTier::Expert,
    ];
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Normal => "normal",
            DifficultyTier::Hard => "hard",
            DifficultyTier::Expert => "expert",
        };
        f.write_str(name)
    }
}

/// Linear map of a raw metric onto 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationRange {
    pub min: f64,
    pub max: f64,
}

impl NormalizationRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationRanges {
    pub shortest_solution_length: NormalizationRange,
    pub visited_nodes: NormalizationRange,
    pub dead_end_ratio: NormalizationRange,
    pub required_rift_count: NormalizationRange,
    pub required_push_pull_count: NormalizationRange,
    pub enemy_exposure_events: NormalizationRange,
    pub paradox_fragility_count: NormalizationRange,
    pub time_depth: NormalizationRange,
}

impl Default for NormalizationRanges {
    fn default() -> Self {
        Self {
            shortest_solution_length: NormalizationRange::new(0.0, 40.0),
            visited_nodes: NormalizationRange::new(0.0, 20_000.0),
            dead_end_ratio: NormalizationRange::new(0.0, 1.0),
            required_rift_count: NormalizationRange::new(0.0, 4.0),
            required_push_pull_count: NormalizationRange::new(0.0, 6.0),
            enemy_exposure_events: NormalizationRange::new(0.0, 10.0),
            paradox_fragility_count: NormalizationRange::new(0.0, 4.0),
            time_depth: NormalizationRange::new(1.0, 32.0),
        }
    }
}

impl NormalizationRanges {
    fn named(&self) -> [(&'static str, NormalizationRange); 8] {
        [
            ("shortest_solution_length", self.shortest_solution_length),
            ("visited_nodes", self.visited_nodes),
            ("dead_end_ratio", self.dead_end_ratio),
            ("required_rift_count", self.required_rift_count),
            ("required_push_pull_count", self.required_push_pull_count),
            ("enemy_exposure_events", self.enemy_exposure_events),
            ("paradox_fragility_count", self.paradox_fragility_count),
            ("time_depth", self.time_depth),
        ]
    }
}

/// How `branch` mixes its two inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BranchBlend {
    pub visited_nodes: f64,
    pub dead_end_ratio: f64,
}

/// How `temporal` mixes its two inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalBlend {
    pub rift_count: f64,
    pub time_depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub spatial: f64,
    pub branch: f64,
    pub temporal: f64,
    pub detection: f64,
    pub interaction: f64,
    pub paradox: f64,
}

impl ScoreWeights {
    fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("spatial", self.spatial),
            ("branch", self.branch),
            ("temporal", self.temporal),
            ("detection", self.detection),
            ("interaction", self.interaction),
            ("paradox", self.paradox),
        ]
    }
}

/// Inclusive score band for one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBound {
    pub tier: DifficultyTier,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyModelConfig {
    pub model_version: String,
    pub normalization: NormalizationRanges,
    pub branch_blend: BranchBlend,
    pub temporal_blend: TemporalBlend,
    pub score_weights: ScoreWeights,
    /// Ordered low to high
    pub tiers: Vec<TierBound>,
    /// Bounds for the search that feeds the metrics
    pub solver: SolverOptions,
}

impl Default for DifficultyModelConfig {
    fn default() -> Self {
        Self {
            model_version: "tcf-difficulty-v1".into(),
            normalization: NormalizationRanges::default(),
            branch_blend: BranchBlend {
                visited_nodes: 0.6,
                dead_end_ratio: 0.4,
            },
            temporal_blend: TemporalBlend {
                rift_count: 0.6,
                time_depth: 0.4,
            },
            // Spatial pressure dominates; paradox risk is a tiebreaker
            score_weights: ScoreWeights {
                spatial: 0.25,
                branch: 0.20,
                temporal: 0.15,
                detection: 0.15,
                interaction: 0.15,
                paradox: 0.10,
            },
            tiers: vec![
                TierBound {
                    tier: DifficultyTier::Easy,
                    min: 0.0,
                    max: 24.0,
                },
                TierBound {
                    tier: DifficultyTier::Normal,
                    min: 25.0,
                    max: 49.0,
                },
                TierBound {
                    tier: DifficultyTier::Hard,
                    min: 50.0,
                    max: 74.0,
                },
                TierBound {
                    tier: DifficultyTier::Expert,
                    min: 75.0,
                    max: 100.0,
                },
            ],
            solver: SolverOptions::default(),
        }
    }
}

impl DifficultyModelConfig {
    /// Parse and validate a model file
    pub fn from_toml_str(content: &str) -> Result<Self, ModelConfigError> {
        let model: Self = toml::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, ModelConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ModelConfigError> {
        for (metric, range) in self.normalization.named() {
            if !(range.max > range.min) {
                return Err(ModelConfigError::InvalidRange {
                    metric,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        check_weights(
            "branch_blend",
            &[
                ("branch_blend.visited_nodes", self.branch_blend.visited_nodes),
                ("branch_blend.dead_end_ratio", self.branch_blend.dead_end_ratio),
            ],
        )?;
        check_weights(
            "temporal_blend",
            &[
                ("temporal_blend.rift_count", self.temporal_blend.rift_count),
                ("temporal_blend.time_depth", self.temporal_blend.time_depth),
            ],
        )?;
        check_weights("score_weights", &self.score_weights.named())?;

        self.validate_tiers()?;
        self.solver.validate().map_err(ModelConfigError::InvalidSolver)
    }

    /// Tiers must cover 0..=100 in order, one band per tier, with no overlap
    /// and gaps no wider than one point (integer-authored bounds)
    fn validate_tiers(&self) -> Result<(), ModelConfigError> {
        let tiers = &self.tiers;
        if tiers.len() != DifficultyTier::ALL.len() {
            return Err(ModelConfigError::InvalidTiers(format!(
                "expected {} tiers, got {}",
                DifficultyTier::ALL.len(),
                tiers.len()
            )));
        }
        for (bound, expected) in tiers.iter().zip(DifficultyTier::ALL) {
            if bound.tier != expected {
                return Err(ModelConfigError::InvalidTiers(format!(
                    "tier {} out of order (expected {})",
                    bound.tier, expected
                )));
            }
            if bound.min > bound.max {
                return Err(ModelConfigError::InvalidTiers(format!(
                    "tier {} has min {} above max {}",
                    bound.tier, bound.min, bound.max
                )));
            }
        }
        if tiers[0].min != 0.0 || tiers[tiers.len() - 1].max != 100.0 {
            return Err(ModelConfigError::InvalidTiers("tiers must span 0..=100".into()));
        }
        for pair in tiers.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            if high.min <= low.max || high.min - low.max > 1.0 {
                return Err(ModelConfigError::InvalidTiers(format!(
                    "{} ends at {} but {} starts at {}",
                    low.tier, low.max, high.tier, high.min
                )));
            }
        }
        Ok(())
    }

    /// Tier for a score: the highest band whose lower bound the score reaches
    pub fn tier_for_score(&self, score: f64) -> DifficultyTier {
        self.tiers
            .iter()
            .rev()
            .find(|bound| score >= bound.min)
            .map(|bound| bound.tier)
            .unwrap_or(DifficultyTier::Easy)
    }
}

fn check_weights(
    group: &'static str,
    weights: &[(&'static str, f64)],
) -> Result<(), ModelConfigError> {
    for &(name, value) in weights {
        if value < 0.0 {
            return Err(ModelConfigError::NegativeWeight { name, value });
        }
    }
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > WEIGHT_EPSILON {
        return Err(ModelConfigError::WeightSum { group, sum });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_validates() {
        assert!(DifficultyModelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_shipped_model_matches_default() {
        let shipped = include_str!("../../data/difficulty_model.toml");
        let model = DifficultyModelConfig::from_toml_str(shipped).unwrap();
        assert_eq!(model, DifficultyModelConfig::default());
    }

    #[test]
    fn test_normalize_clamps() {
        let range = NormalizationRange::new(10.0, 20.0);
        assert_eq!(range.normalize(5.0), 0.0);
        assert_eq!(range.normalize(15.0), 50.0);
        assert_eq!(range.normalize(99.0), 100.0);
    }

    #[test]
    fn test_weight_sum_rejected() {
        let mut model = DifficultyModelConfig::default();
        model.score_weights.spatial = 0.5;
        assert!(matches!(
            model.validate(),
            Err(ModelConfigError::WeightSum { group: "score_weights", .. })
        ));
    }

    #[test]
    fn test_overlapping_tiers_rejected() {
        let mut model = DifficultyModelConfig::default();
        model.tiers[1].min = 20.0;
        assert!(matches!(model.validate(), Err(ModelConfigError::InvalidTiers(_))));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut model = DifficultyModelConfig::default();
        model.normalization.time_depth = NormalizationRange::new(5.0, 5.0);
        assert!(matches!(
            model.validate(),
            Err(ModelConfigError::InvalidRange { metric: "time_depth", .. })
        ));
    }

    #[test]
    fn test_fractional_scores_fall_in_lower_band() {
        let model = DifficultyModelConfig::default();
        assert_eq!(model.tier_for_score(24.5), DifficultyTier::Easy);
        assert_eq!(model.tier_for_score(25.0), DifficultyTier::Normal);
        assert_eq!(model.tier_for_score(74.99), DifficultyTier::Hard);
    }
}
