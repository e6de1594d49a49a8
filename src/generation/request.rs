//! What a caller asks the generator for

use serde::{Deserialize, Serialize};

use crate::core::types::BoardGeometry;
use crate::difficulty::model::DifficultyTier;
use crate::generation::profile::PlacementBudgets;

/// Which object families the generator may place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub enemies: bool,
    pub boxes: bool,
    pub rifts: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enemies: true,
            boxes: true,
            rifts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub seed: u64,
    pub board: BoardGeometry,
    pub difficulty: DifficultyTier,
    /// Replaces the profile's per-tier budgets when set
    #[serde(default)]
    pub budgets: Option<PlacementBudgets>,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Minimum quality score (0..=1) for acceptance
    #[serde(default)]
    pub quality_threshold: f64,
}

fn default_max_attempts() -> u32 {
    32
}

impl GenerationRequest {
    pub fn new(seed: u64, board: BoardGeometry, difficulty: DifficultyTier) -> Self {
        Self {
            seed,
            board,
            difficulty,
            budgets: None,
            features: FeatureFlags::default(),
            max_attempts: default_max_attempts(),
            quality_threshold: 0.0,
        }
    }

    pub fn with_budgets(mut self, budgets: PlacementBudgets) -> Self {
        self.budgets = Some(budgets);
        self
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = threshold;
        self
    }

    /// Board needs room for a start and a distinct exit across two slices
    pub fn validate(&self) -> Result<(), String> {
        let board = self.board;
        if board.width < 2 || board.height < 2 {
            return Err(format!(
                "board must be at least 2x2, got {}x{}",
                board.width, board.height
            ));
        }
        if board.time_depth < 2 {
            return Err(format!("time_depth must be at least 2, got {}", board.time_depth));
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".into());
        }
        if !self.quality_threshold.is_finite() {
            return Err("quality_threshold must be finite".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_boards_rejected() {
        let request = GenerationRequest::new(1, BoardGeometry::new(1, 5, 5), DifficultyTier::Easy);
        assert!(request.validate().is_err());
        let request = GenerationRequest::new(1, BoardGeometry::new(5, 5, 1), DifficultyTier::Easy);
        assert!(request.validate().is_err());
        let request = GenerationRequest::new(1, BoardGeometry::new(5, 5, 5), DifficultyTier::Easy);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let request = GenerationRequest::new(1, BoardGeometry::new(5, 5, 5), DifficultyTier::Easy)
            .with_max_attempts(0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_json_defaults() {
        let json =
            r#"{"seed":7,"board":{"width":6,"height":6,"time_depth":8},"difficulty":"hard"}"#;
        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.max_attempts, 32);
        assert_eq!(request.features, FeatureFlags::default());
        assert_eq!(request.difficulty, DifficultyTier::Hard);
    }
}
