//! Generate-validate-search-score loop
//!
//! Attempts run in order; the first accepted candidate wins. Per-attempt
//! failures are logged and remembered, never surfaced until the budget runs
//! out.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::generation::placement::{attempt_rng, build_candidate};
use crate::generation::profile::{GenerationProfile, ProfileError};
use crate::generation::quality::{quality_score, QualityInputs};
use crate::generation::request::GenerationRequest;
use crate::level::record::LevelRecord;
use crate::level::validation::{LevelValidator, StructuralValidator, ValidationError};
use crate::solver::report::SolvabilityReport;
use crate::solver::search::evaluate_solvability;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Invalid generation request: {0}")]
    InvalidGenerationRequest(String),

    #[error("Invalid generation profile: {0}")]
    InvalidGenerationProfile(#[from] ProfileError),

    /// Every attempt failed structural validation; carries the last one
    #[error("Generated content invalid at attempt {attempt}: {source}")]
    GeneratedContentInvalid {
        attempt: u32,
        source: ValidationError,
    },

    #[error("Generation failed after {attempts} attempts: {last_reason}")]
    GenerationFailed { attempts: u32, last_reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub seed: u64,
    pub attempt: u32,
    pub quality_score: f64,
    pub solver: SolvabilityReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLevel {
    pub content: LevelRecord,
    pub metadata: GenerationMetadata,
}

/// Generate with the built-in structural validator
pub fn generate_level(
    request: &GenerationRequest,
    profile: &GenerationProfile,
) -> Result<GeneratedLevel, GenerationError> {
    generate_level_with(request, profile, &StructuralValidator::new())
}

pub fn generate_level_with(
    request: &GenerationRequest,
    profile: &GenerationProfile,
    validator: &dyn LevelValidator,
) -> Result<GeneratedLevel, GenerationError> {
    request
        .validate()
        .map_err(GenerationError::InvalidGenerationRequest)?;
    profile.validate()?;

    let budgets = request
        .budgets
        .unwrap_or_else(|| profile.budgets.for_tier(request.difficulty));

    let mut last_reason = String::new();
    let mut last_structural: Option<(u32, ValidationError)> = None;
    let mut structural_failures = 0;

    for attempt in 0..request.max_attempts {
        let mut rng = attempt_rng(request.seed, attempt);
        let candidate = build_candidate(request, profile, budgets, attempt, &mut rng);

        if let Err(e) = validator.validate(&candidate) {
            debug!("Attempt {} rejected by validator: {}", attempt, e);
            last_reason = format!("attempt {}: invalid content: {}", attempt, e);
            last_structural = Some((attempt, e));
            structural_failures += 1;
            continue;
        }

        let report = evaluate_solvability(&candidate, &profile.solver_gate);
        if !report.solved {
            debug!(
                "Attempt {} unsolved within gate bounds ({} nodes)",
                attempt, report.visited_nodes
            );
            last_reason = format!(
                "attempt {}: unsolved within gate bounds after {} nodes",
                attempt, report.visited_nodes
            );
            continue;
        }

        let inputs = QualityInputs::measure(&candidate, &report);
        let quality = quality_score(&inputs, &profile.quality_weights, &profile.quality_caps);
        if quality < request.quality_threshold {
            debug!(
                "Attempt {} quality {:.3} below threshold {:.3}",
                attempt, quality, request.quality_threshold
            );
            last_reason = format!(
                "attempt {}: quality {:.3} below threshold {:.3}",
                attempt, quality, request.quality_threshold
            );
            continue;
        }

        info!(
            "Accepted {} at attempt {} (quality {:.3}, path {:?})",
            candidate.id, attempt, quality, report.shortest_path_length
        );
        return Ok(GeneratedLevel {
            content: candidate,
            metadata: GenerationMetadata {
                seed: request.seed,
                attempt,
                quality_score: quality,
                solver: report,
            },
        });
    }

    if structural_failures == request.max_attempts {
        if let Some((attempt, source)) = last_structural {
            return Err(GenerationError::GeneratedContentInvalid { attempt, source });
        }
    }
    Err(GenerationError::GenerationFailed {
        attempts: request.max_attempts,
        last_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BoardGeometry;
    use crate::difficulty::model::DifficultyTier;

    fn request(seed: u64) -> GenerationRequest {
        GenerationRequest::new(seed, BoardGeometry::new(7, 7, 16), DifficultyTier::Easy)
    }

    #[test]
    fn test_bad_request_rejected() {
        let bad = GenerationRequest::new(1, BoardGeometry::new(0, 7, 8), DifficultyTier::Easy);
        assert!(matches!(
            generate_level(&bad, &GenerationProfile::default()),
            Err(GenerationError::InvalidGenerationRequest(_))
        ));
    }

    #[test]
    fn test_bad_profile_rejected() {
        let mut profile = GenerationProfile::default();
        profile.quality_caps.walls = 0;
        assert!(matches!(
            generate_level(&request(1), &profile),
            Err(GenerationError::InvalidGenerationProfile(_))
        ));
    }

    #[test]
    fn test_all_structural_failures_surface_validator_error() {
        let reject =
            |_: &LevelRecord| -> Result<(), ValidationError> { Err(ValidationError::MissingExit) };
        let req = request(3).with_max_attempts(4);
        let err = generate_level_with(&req, &GenerationProfile::default(), &reject).unwrap_err();
        match err {
            GenerationError::GeneratedContentInvalid { attempt, source } => {
                assert_eq!(attempt, 3);
                assert_eq!(source, ValidationError::MissingExit);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_accepted_level_is_solved() {
        let generated = generate_level(&request(11), &GenerationProfile::default()).unwrap();
        assert!(generated.metadata.solver.solved);
        assert_eq!(generated.metadata.seed, 11);
        assert_eq!(
            generated.content.id,
            format!("gen-11-{}", generated.metadata.attempt)
        );
    }
}
