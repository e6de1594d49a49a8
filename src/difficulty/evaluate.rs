//! Difficulty evaluation: raw metrics -> normalized dimensions -> score -> tier

use serde::{Deserialize, Serialize};

use crate::difficulty::model::{DifficultyModelConfig, DifficultyTier};
use crate::level::record::{LevelRecord, ResolvedView};
use crate::solver::options::SolverOptions;
use crate::solver::report::SolvabilityReport;
use crate::solver::search::evaluate_solvability;
use crate::spacetime::archetype::ComponentSet;

/// Unnormalized inputs to the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    /// Solver path length, or the normalization maximum when unsolved
    pub shortest_solution_length: f64,
    pub visited_nodes: usize,
    pub dead_end_ratio: f64,
    pub required_rift_count: u32,
    pub required_push_pull_count: u32,
    pub enemy_exposure_events: u32,
    pub paradox_fragility_count: u32,
    pub time_depth: i32,
}

/// Headline pressures reported to content gating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyVector {
    pub spatial_pressure: f64,
    pub temporal_pressure: f64,
    pub detection_pressure: f64,
    pub interaction_complexity: f64,
    pub paradox_risk: f64,
}

/// All six weighted dimensions, each in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyDimensions {
    pub spatial: f64,
    pub branch: f64,
    pub temporal: f64,
    pub detection: f64,
    pub interaction: f64,
    pub paradox: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyEvaluation {
    pub model_version: String,
    pub score: f64,
    pub tier: DifficultyTier,
    pub vector: DifficultyVector,
    pub dimensions: DifficultyDimensions,
    pub raw: RawMetrics,
    pub solver: SolvabilityReport,
}

/// Score a validated level
///
/// `options` overrides the model's own solver bounds. The model is assumed
/// to have passed `DifficultyModelConfig::validate`.
pub fn evaluate_difficulty(
    level: &LevelRecord,
    model: &DifficultyModelConfig,
    options: Option<&SolverOptions>,
) -> DifficultyEvaluation {
    let solver_options = options.copied().unwrap_or(model.solver);
    let report = evaluate_solvability(level, &solver_options);
    let raw = collect_raw_metrics(level, model, &report);
    let dimensions = compute_dimensions(&raw, model);

    let weights = &model.score_weights;
    let weighted = dimensions.spatial * weights.spatial
        + dimensions.branch * weights.branch
        + dimensions.temporal * weights.temporal
        + dimensions.detection * weights.detection
        + dimensions.interaction * weights.interaction
        + dimensions.paradox * weights.paradox;
    let score = round2(weighted.clamp(0.0, 100.0));

    DifficultyEvaluation {
        model_version: model.model_version.clone(),
        score,
        tier: model.tier_for_score(score),
        vector: DifficultyVector {
            spatial_pressure: dimensions.spatial,
            temporal_pressure: dimensions.temporal,
            detection_pressure: dimensions.detection,
            interaction_complexity: dimensions.interaction,
            paradox_risk: dimensions.paradox,
        },
        dimensions,
        raw,
        solver: report,
    }
}

pub fn collect_raw_metrics(
    level: &LevelRecord,
    model: &DifficultyModelConfig,
    report: &SolvabilityReport,
) -> RawMetrics {
    let shortest_solution_length = match report.shortest_path_length {
        Some(length) if report.solved => length as f64,
        _ => model.normalization.shortest_solution_length.max,
    };

    // Path counts win only when the solver actually needed the mechanic
    let static_rifts = level.count_objects(|o| o.rift().is_some()) as u32;
    let static_push_pull = level.count_objects(|o| o.is_pushable() || o.is_pullable()) as u32;
    let required_rift_count = if report.solved && report.required_rift_count > 0 {
        report.required_rift_count
    } else {
        static_rifts
    };
    let required_push_pull_count = if report.solved && report.required_push_pull_count > 0 {
        report.required_push_pull_count
    } else {
        static_push_pull
    };

    RawMetrics {
        shortest_solution_length,
        visited_nodes: report.visited_nodes,
        dead_end_ratio: report.dead_end_ratio,
        required_rift_count,
        required_push_pull_count,
        enemy_exposure_events: report.enemy_exposure_events.max(static_exposure_estimate(level)),
        paradox_fragility_count: paradox_fragility_count(level),
        time_depth: level.board.time_depth,
    }
}

/// Worst-case exposure from patrol reach around the start
///
/// Each enabled enemy contributes how far its reach (detection range plus
/// patrol span plus one) extends past its distance to the start.
pub fn static_exposure_estimate(level: &LevelRecord) -> u32 {
    let start = level.start.spatial();
    let mut total = 0;
    for instance in &level.objects {
        let Ok(components) = level.resolved_components(instance) else {
            continue;
        };
        let view = ResolvedView(&components);
        let is_enemy = view.patrol().is_some()
            || level
                .archetype(&instance.archetype)
                .is_some_and(|a| a.kind == "enemy");
        if !is_enemy {
            continue;
        }

        let profile = level.detection.resolve(&instance.id);
        if !profile.enabled {
            continue;
        }
        let span = view.patrol().map(|p| p.span()).unwrap_or(0);
        let reach = profile.max_distance + span + 1;
        let distance = instance.position.spatial().manhattan_distance(&start);
        total += reach.saturating_sub(distance);
    }
    total
}

/// Backward-in-time rifts, plus one per bidirectional rift
pub fn paradox_fragility_count(level: &LevelRecord) -> u32 {
    level
        .rifts()
        .iter()
        .map(|(source, rift)| u32::from(rift.target.t < source.t) + u32::from(rift.bidirectional))
        .sum()
}

pub fn compute_dimensions(raw: &RawMetrics, model: &DifficultyModelConfig) -> DifficultyDimensions {
    let ranges = &model.normalization;
    let visited = ranges.visited_nodes.normalize(raw.visited_nodes as f64);
    let dead_ends = ranges.dead_end_ratio.normalize(raw.dead_end_ratio);
    let rifts = ranges.required_rift_count.normalize(raw.required_rift_count as f64);
    let depth = ranges.time_depth.normalize(raw.time_depth as f64);

    DifficultyDimensions {
        spatial: ranges
            .shortest_solution_length
            .normalize(raw.shortest_solution_length),
        branch: visited * model.branch_blend.visited_nodes
            + dead_ends * model.branch_blend.dead_end_ratio,
        temporal: rifts * model.temporal_blend.rift_count + depth * model.temporal_blend.time_depth,
        detection: ranges
            .enemy_exposure_events
            .normalize(raw.enemy_exposure_events as f64),
        interaction: ranges
            .required_push_pull_count
            .normalize(raw.required_push_pull_count as f64),
        paradox: ranges
            .paradox_fragility_count
            .normalize(raw.paradox_fragility_count as f64),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Position2D, Position3D};
    use crate::interaction::detection::DetectionProfile;
    use crate::level::builder::LevelBuilder;

    #[test]
    fn test_unsolved_counts_as_longest() {
        let level = LevelBuilder::new("wall", 4, 4, 6)
            .start(0, 0)
            .wall_row(1)
            .exit(3, 3)
            .build();
        let model = DifficultyModelConfig::default();
        let evaluation = evaluate_difficulty(&level, &model, None);
        assert!(!evaluation.solver.solved);
        assert_eq!(evaluation.raw.shortest_solution_length, 40.0);
        assert_eq!(evaluation.dimensions.spatial, 100.0);
    }

    #[test]
    fn test_static_counts_fill_in_when_solver_did_not_need_them() {
        let level = LevelBuilder::new("idle", 6, 6, 8)
            .start(0, 0)
            .exit(2, 0)
            .pushable(5, 5)
            .rift(4, 4, Position3D::new(4, 3, 0), true)
            .build();
        let evaluation = evaluate_difficulty(&level, &DifficultyModelConfig::default(), None);
        assert!(evaluation.solver.solved);
        assert_eq!(evaluation.raw.required_rift_count, 1);
        assert_eq!(evaluation.raw.required_push_pull_count, 1);
        assert_eq!(evaluation.raw.paradox_fragility_count, 1);
    }

    #[test]
    fn test_paradox_count() {
        let level = LevelBuilder::new("px", 6, 6, 8)
            .start(0, 0)
            .exit(5, 5)
            .custom(
                crate::level::builder::standard_archetype("rift").unwrap(),
                Position3D::new(1, 1, 4),
                vec![crate::spacetime::components::Component::Rift(
                    crate::spacetime::components::RiftData::bidirectional(Position3D::new(2, 2, 1)),
                )],
            )
            .rift(3, 3, Position3D::new(3, 4, 2), false)
            .build();
        // Backward + bidirectional on the first; the second starts at t=0
        assert_eq!(paradox_fragility_count(&level), 2);
    }

    #[test]
    fn test_static_exposure_estimate() {
        let quiet = DetectionProfile {
            max_distance: 2,
            ..DetectionProfile::default()
        };
        let level = LevelBuilder::new("exp", 10, 10, 6)
            .start(0, 0)
            .exit(9, 9)
            .patrol(3, 0, vec![Position2D::new(3, 0), Position2D::new(4, 0)], true)
            .sentry(9, 0)
            .fallback_detection(quiet)
            .build();
        // Patroller: reach 2 + 1 + 1 = 4 at distance 3; sentry: reach 3 at distance 9
        assert_eq!(static_exposure_estimate(&level), 1);
    }

    #[test]
    fn test_score_is_rounded_and_bounded() {
        let level = LevelBuilder::new("s", 5, 5, 7).start(0, 0).exit(4, 4).build();
        let evaluation = evaluate_difficulty(&level, &DifficultyModelConfig::default(), None);
        assert!((0.0..=100.0).contains(&evaluation.score));
        assert_eq!(evaluation.score, round2(evaluation.score));
        assert_eq!(evaluation.model_version, "tcf-difficulty-v1");
    }
}
