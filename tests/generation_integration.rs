//! Level generation integration tests

use timecube_forge::core::types::BoardGeometry;
use timecube_forge::difficulty::DifficultyTier;
use timecube_forge::generation::{
    attempt_rng, build_candidate, generate_level, FeatureFlags, GenerationError, GenerationProfile,
    GenerationRequest,
};
use timecube_forge::level::{LevelValidator, StructuralValidator};
use timecube_forge::solver::evaluate_solvability;

fn request(seed: u64, tier: DifficultyTier) -> GenerationRequest {
    GenerationRequest::new(seed, BoardGeometry::new(7, 7, 16), tier)
}

#[test]
fn test_same_request_same_level() {
    let profile = GenerationProfile::default();
    let first = generate_level(&request(2024, DifficultyTier::Easy), &profile);
    let second = generate_level(&request(2024, DifficultyTier::Easy), &profile);
    match (first, second) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        _ => panic!("identical requests diverged"),
    }
}

#[test]
fn test_seeds_change_layout() {
    let profile = GenerationProfile::default();
    let budgets = profile.budgets.for_tier(DifficultyTier::Normal);
    let layouts: Vec<_> = (0..4u64)
        .map(|seed| {
            let req = request(seed, DifficultyTier::Normal);
            let level = build_candidate(&req, &profile, budgets, 0, &mut attempt_rng(seed, 0));
            let cells: Vec<_> = level.objects.iter().map(|o| o.position).collect();
            (level.start, cells)
        })
        .collect();
    assert!(layouts.iter().any(|l| *l != layouts[0]));
}

#[test]
fn test_unreachable_threshold_exhausts_attempts() {
    let profile = GenerationProfile::default();
    for attempts in [1, 5] {
        let req = request(7, DifficultyTier::Easy)
            .with_max_attempts(attempts)
            .with_quality_threshold(1.5);
        match generate_level(&req, &profile) {
            Err(GenerationError::GenerationFailed {
                attempts: used,
                last_reason,
            }) => {
                assert_eq!(used, attempts);
                assert!(!last_reason.is_empty());
            }
            other => panic!("expected GenerationFailed, got {:?}", other.map(|g| g.metadata)),
        }
    }
}

#[test]
fn test_accepted_level_revalidates_and_resolves() {
    let profile = GenerationProfile::default();
    let generated = generate_level(&request(11, DifficultyTier::Easy), &profile).unwrap();

    assert_eq!(StructuralValidator::new().validate(&generated.content), Ok(()));
    let report = evaluate_solvability(&generated.content, &profile.solver_gate);
    assert!(report.solved);
    assert_eq!(report, generated.metadata.solver);
    assert!((0.0..=1.0).contains(&generated.metadata.quality_score));
    assert!(generated.metadata.attempt < 32);
}

#[test]
fn test_disabled_features_place_nothing_extra() {
    let profile = GenerationProfile::default();
    let plain = FeatureFlags {
        enemies: false,
        boxes: false,
        rifts: false,
    };
    let req = request(99, DifficultyTier::Expert).with_features(plain);
    if let Ok(generated) = generate_level(&req, &profile) {
        assert!(generated
            .content
            .objects
            .iter()
            .all(|o| o.archetype == "wall" || o.archetype == "exit"));
    }
}

#[test]
fn test_normal_tier_output_is_playable() {
    let profile = GenerationProfile::default();
    match generate_level(&request(5, DifficultyTier::Normal), &profile) {
        Ok(generated) => {
            assert_eq!(StructuralValidator::new().validate(&generated.content), Ok(()));
            assert!(evaluate_solvability(&generated.content, &profile.solver_gate).solved);
        }
        Err(GenerationError::GenerationFailed { attempts, .. }) => assert_eq!(attempts, 32),
        Err(other) => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_generated_level_survives_json() {
    let profile = GenerationProfile::default();
    let generated = generate_level(&request(3, DifficultyTier::Easy), &profile).unwrap();
    let json = generated.content.to_json_string().unwrap();
    let parsed = timecube_forge::level::LevelRecord::from_json_str(&json).unwrap();
    assert_eq!(parsed, generated.content);
}
