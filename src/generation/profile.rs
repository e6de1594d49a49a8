//! Generation profile: budgets, strategies, gate bounds and quality weights
//!
//! Shipped defaults live in `data/generation_profile.toml`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::RuleDefaults;
use crate::difficulty::model::DifficultyTier;
use crate::interaction::detection::{DetectionModel, DetectionProfile};
use crate::solver::options::SolverOptions;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Quality weights: {0}")]
    InvalidWeights(String),

    #[error("Quality caps: {0}")]
    InvalidCaps(String),

    #[error("Patrol behavior mix has no weight")]
    EmptyBehaviorMix,

    #[error("Solver gate: {0}")]
    InvalidSolverGate(String),

    #[error("Rules: {0}")]
    InvalidRules(String),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Upper bounds on placed objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementBudgets {
    pub walls: u32,
    pub enemies: u32,
    pub boxes: u32,
    pub rifts: u32,
}

impl PlacementBudgets {
    pub const fn new(walls: u32, enemies: u32, boxes: u32, rifts: u32) -> Self {
        Self {
            walls,
            enemies,
            boxes,
            rifts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBudgets {
    pub easy: PlacementBudgets,
    pub normal: PlacementBudgets,
    pub hard: PlacementBudgets,
    pub expert: PlacementBudgets,
}

impl TierBudgets {
    pub fn for_tier(&self, tier: DifficultyTier) -> PlacementBudgets {
        match tier {
            DifficultyTier::Easy => self.easy,
            DifficultyTier::Normal => self.normal,
            DifficultyTier::Hard => self.hard,
            DifficultyTier::Expert => self.expert,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallCountStrategy {
    /// Always place the full wall budget
    Fixed,
    /// Uniform count in 0..=budget
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatrolPathOrder {
    /// Walk the segment and jump back to its start
    Forward,
    /// Walk the segment out and back
    PingPong,
}

/// Relative odds of each patrol behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorMix {
    pub stationary: u32,
    pub patrol: u32,
}

impl BehaviorMix {
    pub fn total(&self) -> u32 {
        self.stationary + self.patrol
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityWeights {
    pub path_length: f64,
    pub enemies: f64,
    pub walls: f64,
    pub boxes: f64,
}

/// Values at or above a cap count as full marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCaps {
    pub path_length: u32,
    pub enemies: u32,
    pub walls: u32,
    pub boxes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationProfile {
    pub budgets: TierBudgets,
    /// Cheap search bounds used to accept or reject candidates
    pub solver_gate: SolverOptions,
    pub quality_weights: QualityWeights,
    pub quality_caps: QualityCaps,
    pub wall_strategy: WallCountStrategy,
    pub patrol_order: PatrolPathOrder,
    pub behavior_mix: BehaviorMix,
    /// Longest straight patrol segment, in cells
    pub patrol_length: u32,
    pub rules: RuleDefaults,
    /// Fallback detection profile written into generated levels
    pub detection: DetectionProfile,
}

impl Default for GenerationProfile {
    fn default() -> Self {
        Self {
            budgets: TierBudgets {
                easy: PlacementBudgets::new(4, 0, 0, 0),
                normal: PlacementBudgets::new(6, 1, 1, 1),
                hard: PlacementBudgets::new(8, 2, 2, 1),
                expert: PlacementBudgets::new(10, 3, 2, 2),
            },
            solver_gate: SolverOptions {
                max_depth: 24,
                max_nodes: 4_000,
                include_push_pull: true,
                include_rifts: true,
                prune_detected: true,
            },
            quality_weights: QualityWeights {
                path_length: 0.4,
                enemies: 0.2,
                walls: 0.2,
                boxes: 0.2,
            },
            quality_caps: QualityCaps {
                path_length: 20,
                enemies: 3,
                walls: 12,
                boxes: 3,
            },
            wall_strategy: WallCountStrategy::Fixed,
            patrol_order: PatrolPathOrder::PingPong,
            behavior_mix: BehaviorMix {
                stationary: 1,
                patrol: 2,
            },
            patrol_length: 3,
            rules: RuleDefaults::default(),
            detection: DetectionProfile {
                enabled: true,
                model: DetectionModel::DelayedSensing,
                delay_turns: 1,
                max_distance: 2,
                line_of_sight: true,
            },
        }
    }
}

impl GenerationProfile {
    pub fn from_toml_str(content: &str) -> Result<Self, ProfileError> {
        let profile: Self = toml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let w = &self.quality_weights;
        let weights = [w.path_length, w.enemies, w.walls, w.boxes];
        if weights.iter().any(|v| *v < 0.0 || !v.is_finite()) {
            return Err(ProfileError::InvalidWeights(
                "weights must be finite and non-negative".into(),
            ));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ProfileError::InvalidWeights(format!(
                "weights must sum to 1 (got {})",
                sum
            )));
        }

        let c = &self.quality_caps;
        if [c.path_length, c.enemies, c.walls, c.boxes].contains(&0) {
            return Err(ProfileError::InvalidCaps("every cap must be positive".into()));
        }

        if self.behavior_mix.total() == 0 {
            return Err(ProfileError::EmptyBehaviorMix);
        }

        self.solver_gate
            .validate()
            .map_err(ProfileError::InvalidSolverGate)?;
        self.rules.validate().map_err(ProfileError::InvalidRules)
    }
}
