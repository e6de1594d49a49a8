//! Acceptance score for solved candidates
//!
//! Each term is a count capped at its ceiling and scaled to 0..=1; the
//! weighted sum therefore stays in 0..=1 when the weights sum to one.

use serde::{Deserialize, Serialize};

use crate::generation::profile::{QualityCaps, QualityWeights};
use crate::level::record::{LevelRecord, ResolvedView};
use crate::solver::report::SolvabilityReport;
use crate::spacetime::archetype::ComponentSet;

/// Counts the quality score is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityInputs {
    pub path_length: u32,
    pub enemies: u32,
    pub walls: u32,
    pub boxes: u32,
}

impl QualityInputs {
    pub fn measure(level: &LevelRecord, report: &SolvabilityReport) -> Self {
        let mut enemies = 0;
        let mut walls = 0;
        for instance in &level.objects {
            let Some(archetype) = level.archetype(&instance.archetype) else {
                continue;
            };
            let Ok(components) = level.resolved_components(instance) else {
                continue;
            };
            if archetype.kind == "enemy" || ResolvedView(&components).patrol().is_some() {
                enemies += 1;
            }
            if archetype.kind == "wall" {
                walls += 1;
            }
        }

        Self {
            path_length: report.shortest_path_length.unwrap_or(0) as u32,
            enemies,
            walls,
            boxes: level.count_objects(|o| o.is_pushable() || o.is_pullable()) as u32,
        }
    }
}

pub fn quality_score(inputs: &QualityInputs, weights: &QualityWeights, caps: &QualityCaps) -> f64 {
    capped(inputs.path_length, caps.path_length) * weights.path_length
        + capped(inputs.enemies, caps.enemies) * weights.enemies
        + capped(inputs.walls, caps.walls) * weights.walls
        + capped(inputs.boxes, caps.boxes) * weights.boxes
}

fn capped(value: u32, cap: u32) -> f64 {
    if cap == 0 {
        return 0.0;
    }
    value.min(cap) as f64 / cap as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Position2D;
    use crate::generation::profile::GenerationProfile;
    use crate::level::builder::LevelBuilder;

    #[test]
    fn test_full_marks_at_caps() {
        let profile = GenerationProfile::default();
        let maxed = QualityInputs {
            path_length: 50,
            enemies: 9,
            walls: 40,
            boxes: 9,
        };
        let score = quality_score(&maxed, &profile.quality_weights, &profile.quality_caps);
        assert!((score - 1.0).abs() < 1e-9);

        let empty = QualityInputs {
            path_length: 0,
            enemies: 0,
            walls: 0,
            boxes: 0,
        };
        assert_eq!(quality_score(&empty, &profile.quality_weights, &profile.quality_caps), 0.0);
    }

    #[test]
    fn test_measure_counts_objects() {
        let level = LevelBuilder::new("q", 6, 6, 6)
            .wall(1, 1)
            .wall(2, 1)
            .pushable(3, 3)
            .patrol(5, 5, vec![Position2D::new(5, 5), Position2D::new(5, 4)], true)
            .exit(0, 5)
            .build();
        let report = SolvabilityReport {
            shortest_path_length: Some(7),
            solved: true,
            ..SolvabilityReport::not_started()
        };
        let inputs = QualityInputs::measure(&level, &report);
        assert_eq!(
            inputs,
            QualityInputs {
                path_length: 7,
                enemies: 1,
                walls: 2,
                boxes: 1
            }
        );
    }
}
