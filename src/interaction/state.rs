//! Mutable game snapshot threaded through the transition function

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::config::RuleDefaults;
use crate::core::types::{BoardGeometry, Position3D, Turn};
use crate::interaction::actions::Action;
use crate::interaction::detection::{evaluate_detection, DetectionReport};
use crate::level::record::{DetectionRules, LevelError, LevelRecord};
use crate::spacetime::time_cube::TimeCube;
use crate::spacetime::world_line::WorldLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Playing,
    /// Reached an exit; only `restart` leaves this phase
    Won,
    /// Seen by an enemy under `play`; only `restart` leaves this phase
    Detected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePools {
    /// Remaining rift charges; None when rifts are untracked
    pub rift_charges: Option<u32>,
}

/// What `restart` rolls back to
#[derive(Debug)]
struct InitialSnapshot {
    cube: TimeCube,
    start: Position3D,
    resources: ResourcePools,
}

/// Full game state
///
/// Cloning is the branching primitive of the solver: every frontier entry
/// owns its own copy. The initial snapshot is shared between clones.
#[derive(Debug, Clone)]
pub struct InteractionState {
    pub board: BoardGeometry,
    pub cube: TimeCube,
    pub world_line: WorldLine,
    pub turn: Turn,
    pub current_time: i32,
    pub phase: Phase,
    pub rules: RuleDefaults,
    pub detection: DetectionRules,
    pub resources: ResourcePools,
    pub history: Vec<Action>,
    initial: Arc<InitialSnapshot>,
}

impl InteractionState {
    /// Bootstrap a fresh game from a level record
    pub fn from_level(level: &LevelRecord) -> Result<Self, LevelError> {
        let cube = level.build_cube()?;
        let resources = ResourcePools {
            rift_charges: level.rules.rift.charges,
        };
        let initial = Arc::new(InitialSnapshot {
            cube: cube.clone(),
            start: level.start,
            resources,
        });

        Ok(Self {
            board: level.board,
            cube,
            world_line: WorldLine::create(level.start),
            turn: 0,
            current_time: level.start.t,
            phase: Phase::Playing,
            rules: level.rules,
            detection: level.detection.clone(),
            resources,
            history: Vec::new(),
            initial,
        })
    }

    /// Roll back to the state `from_level` produced
    pub fn restart(&mut self) {
        self.cube = self.initial.cube.clone();
        self.world_line = WorldLine::create(self.initial.start);
        self.turn = 0;
        self.current_time = self.initial.start.t;
        self.phase = Phase::Playing;
        self.resources = self.initial.resources;
        self.history.clear();
    }

    pub fn player_position(&self) -> Position3D {
        self.world_line.current_position()
    }

    pub fn is_won(&self) -> bool {
        self.phase == Phase::Won
    }

    pub fn is_detected(&self) -> bool {
        self.phase == Phase::Detected
    }

    pub fn on_exit(&self) -> bool {
        self.cube.has_exit(self.player_position())
    }

    /// Read-only detection check for the current position
    pub fn detect(&self) -> DetectionReport {
        evaluate_detection(&self.cube, &self.detection, self.player_position())
    }
}
