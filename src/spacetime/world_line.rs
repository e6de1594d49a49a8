//! The player's realized path through spacetime

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Position3D, Turn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldLineError {
    #[error("Paradox: {position} already lies on the world line (turn {turn})")]
    SelfIntersection { position: Position3D, turn: Turn },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldLineEntry {
    pub turn: Turn,
    pub position: Position3D,
}

/// Ordered list of committed player positions
///
/// Several entries may share a slice (rifts revisit earlier time), but each
/// (x, y, t) cell appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldLine {
    entries: Vec<WorldLineEntry>,
}

impl WorldLine {
    pub fn create(start: Position3D) -> Self {
        Self {
            entries: vec![WorldLineEntry {
                turn: 0,
                position: start,
            }],
        }
    }

    pub fn append(&mut self, turn: Turn, position: Position3D) -> Result<(), WorldLineError> {
        if let Some(existing) = self.entries.iter().find(|e| e.position == position) {
            return Err(WorldLineError::SelfIntersection {
                position,
                turn: existing.turn,
            });
        }
        self.entries.push(WorldLineEntry { turn, position });
        Ok(())
    }

    pub fn current_position(&self) -> Position3D {
        // create() seeds one entry and nothing removes entries
        self.entries
            .last()
            .map(|e| e.position)
            .unwrap_or_default()
    }

    /// Every past self standing on slice `t`
    pub fn positions_at_time(&self, t: i32) -> Vec<Position3D> {
        self.entries
            .iter()
            .filter(|e| e.position.t == t)
            .map(|e| e.position)
            .collect()
    }

    pub fn contains(&self, position: Position3D) -> bool {
        self.entries.iter().any(|e| e.position == position)
    }

    pub fn entries(&self) -> &[WorldLineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_tracks_current_position() {
        let mut line = WorldLine::create(Position3D::new(0, 0, 0));
        line.append(1, Position3D::new(1, 0, 1)).unwrap();
        assert_eq!(line.current_position(), Position3D::new(1, 0, 1));
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn test_self_intersection_rejected() {
        let mut line = WorldLine::create(Position3D::new(0, 0, 0));
        line.append(1, Position3D::new(0, 0, 1)).unwrap();
        let err = line.append(2, Position3D::new(0, 0, 0)).unwrap_err();
        assert_eq!(
            err,
            WorldLineError::SelfIntersection {
                position: Position3D::new(0, 0, 0),
                turn: 0
            }
        );
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn test_positions_at_time_after_rift() {
        let mut line = WorldLine::create(Position3D::new(0, 0, 0));
        line.append(1, Position3D::new(1, 0, 1)).unwrap();
        line.append(2, Position3D::new(1, 0, 0)).unwrap();
        let at_zero = line.positions_at_time(0);
        assert_eq!(at_zero, vec![Position3D::new(0, 0, 0), Position3D::new(1, 0, 0)]);
        assert!(line.positions_at_time(5).is_empty());
    }
}
