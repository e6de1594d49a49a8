//! Seeded level generation gated by the solvability search

pub mod generator;
pub mod placement;
pub mod profile;
pub mod quality;
pub mod request;

pub use generator::{
    generate_level, generate_level_with, GeneratedLevel, GenerationError, GenerationMetadata,
};
pub use placement::{attempt_rng, build_candidate};
pub use profile::{
    BehaviorMix, GenerationProfile, PatrolPathOrder, PlacementBudgets, ProfileError, QualityCaps,
    QualityWeights, TierBudgets, WallCountStrategy,
};
pub use quality::{quality_score, QualityInputs};
pub use request::{FeatureFlags, GenerationRequest};
