//! Structural validation of level records
//!
//! The search and scoring code assume a record has passed a `LevelValidator`.
//! The generator takes the validator as a parameter so callers can swap in
//! stricter content rules.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::types::{ObjectId, Position2D, Position3D};
use crate::level::record::{LevelError, LevelRecord, ResolvedView};
use crate::spacetime::archetype::ComponentSet;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Board must have positive dimensions, got {width}x{height}x{time_depth}")]
    InvalidBoard {
        width: i32,
        height: i32,
        time_depth: i32,
    },

    #[error("Start position {0} is outside the board")]
    StartOutOfBounds(Position3D),

    #[error("Start position is blocked by {0}")]
    StartBlocked(ObjectId),

    #[error("Duplicate archetype id: {0}")]
    DuplicateArchetype(String),

    #[error("Duplicate object id: {0}")]
    DuplicateObject(ObjectId),

    #[error("Object {object} references unknown archetype '{archetype}'")]
    UnknownArchetype { object: ObjectId, archetype: String },

    #[error("Object {object} at {position} is outside the board")]
    ObjectOutOfBounds {
        object: ObjectId,
        position: Position3D,
    },

    #[error("Level has no exit")]
    MissingExit,

    #[error("Patrol of {0} has an empty path")]
    EmptyPatrol(ObjectId),

    #[error("Patrol of {object} leaves the board at {cell}")]
    PatrolOutOfBounds { object: ObjectId, cell: Position2D },

    #[error("Rift {object} targets {target}, outside the board")]
    RiftTargetOutOfBounds {
        object: ObjectId,
        target: Position3D,
    },

    #[error("Unknown detection profile '{0}'")]
    UnknownDetectionProfile(String),

    #[error("Invalid rules: {0}")]
    InvalidRules(String),

    #[error("Objects cannot be placed: {0}")]
    Placement(String),
}

/// Accepts or rejects a candidate level before it is searched
pub trait LevelValidator {
    fn validate(&self, level: &LevelRecord) -> Result<(), ValidationError>;
}

impl<F> LevelValidator for F
where
    F: Fn(&LevelRecord) -> Result<(), ValidationError>,
{
    fn validate(&self, level: &LevelRecord) -> Result<(), ValidationError> {
        self(level)
    }
}

/// Board, reference and placement checks
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator {
    /// Accept levels without an exit (useful for sandbox content)
    pub allow_missing_exit: bool,
}

impl StructuralValidator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LevelValidator for StructuralValidator {
    fn validate(&self, level: &LevelRecord) -> Result<(), ValidationError> {
        let board = level.board;
        if board.width <= 0 || board.height <= 0 || board.time_depth <= 0 {
            return Err(ValidationError::InvalidBoard {
                width: board.width,
                height: board.height,
                time_depth: board.time_depth,
            });
        }
        if !board.contains(level.start) {
            return Err(ValidationError::StartOutOfBounds(level.start));
        }
        level.rules.validate().map_err(ValidationError::InvalidRules)?;

        let mut archetype_ids = BTreeSet::new();
        for archetype in &level.archetypes {
            if !archetype_ids.insert(archetype.id.as_str()) {
                return Err(ValidationError::DuplicateArchetype(archetype.id.clone()));
            }
        }

        let mut object_ids = BTreeSet::new();
        let mut exits = 0;
        for instance in &level.objects {
            if !object_ids.insert(&instance.id) {
                return Err(ValidationError::DuplicateObject(instance.id.clone()));
            }
            if !board.contains(instance.position) {
                return Err(ValidationError::ObjectOutOfBounds {
                    object: instance.id.clone(),
                    position: instance.position,
                });
            }
            let components = level.resolved_components(instance).map_err(|_| {
                ValidationError::UnknownArchetype {
                    object: instance.id.clone(),
                    archetype: instance.archetype.clone(),
                }
            })?;
            let view = ResolvedView(&components);

            if view.is_exit() {
                exits += 1;
            }
            if let Some(patrol) = view.patrol() {
                if patrol.path.is_empty() {
                    return Err(ValidationError::EmptyPatrol(instance.id.clone()));
                }
                if let Some(cell) = patrol.path.iter().find(|c| !board.contains_spatial(**c)) {
                    return Err(ValidationError::PatrolOutOfBounds {
                        object: instance.id.clone(),
                        cell: *cell,
                    });
                }
            }
            if let Some(rift) = view.rift() {
                if !board.contains(rift.target) {
                    return Err(ValidationError::RiftTargetOutOfBounds {
                        object: instance.id.clone(),
                        target: rift.target,
                    });
                }
            }
        }
        if exits == 0 && !self.allow_missing_exit {
            return Err(ValidationError::MissingExit);
        }

        let detection = &level.detection;
        let referenced = detection
            .default_profile
            .iter()
            .chain(detection.assignments.values());
        for name in referenced {
            if !detection.profiles.contains_key(name) {
                return Err(ValidationError::UnknownDetectionProfile(name.clone()));
            }
        }

        let cube = level.build_cube().map_err(|e| match e {
            LevelError::UnknownArchetype { object, archetype } => {
                ValidationError::UnknownArchetype { object, archetype }
            }
            other => ValidationError::Placement(other.to_string()),
        })?;
        if let Some(blocker) = cube.blocking_object_at(level.start, &[]) {
            return Err(ValidationError::StartBlocked(blocker.id.clone()));
        }

        Ok(())
    }
}
