//! Level records: data model, construction and structural validation

pub mod builder;
pub mod record;
pub mod validation;

pub use builder::{standard_archetype, LevelBuilder};
pub use record::{DetectionRules, LevelError, LevelRecord, ResolvedView};
pub use validation::{LevelValidator, StructuralValidator, ValidationError};
