//! Capability tags attached to archetypes

use serde::{Deserialize, Serialize};

use crate::core::types::{Position2D, Position3D};

/// Closed set of capabilities an object can carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Component {
    BlocksMovement,
    BlocksVision,
    /// Present on every slice unless relocated per slice
    TimePersistent,
    Exit,
    Pushable,
    Pullable,
    Patrol(PatrolData),
    Rift(RiftData),
}

/// Discriminant of a `Component`, used to merge override lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    BlocksMovement,
    BlocksVision,
    TimePersistent,
    Exit,
    Pushable,
    Pullable,
    Patrol,
    Rift,
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::BlocksMovement => ComponentKind::BlocksMovement,
            Component::BlocksVision => ComponentKind::BlocksVision,
            Component::TimePersistent => ComponentKind::TimePersistent,
            Component::Exit => ComponentKind::Exit,
            Component::Pushable => ComponentKind::Pushable,
            Component::Pullable => ComponentKind::Pullable,
            Component::Patrol(_) => ComponentKind::Patrol,
            Component::Rift(_) => ComponentKind::Rift,
        }
    }
}

/// Deterministic patrol route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatrolData {
    pub path: Vec<Position2D>,
    #[serde(default = "default_loops")]
    pub loops: bool,
}

fn default_loops() -> bool {
    true
}

impl PatrolData {
    pub fn new(path: Vec<Position2D>, loops: bool) -> Self {
        Self { path, loops }
    }

    /// Position on slice `t`
    ///
    /// Looping routes wrap around; one-way routes hold their last cell.
    /// Returns None for an empty route or negative time.
    pub fn position_at(&self, t: i32) -> Option<Position2D> {
        if self.path.is_empty() || t < 0 {
            return None;
        }
        let index = if self.loops {
            (t as usize) % self.path.len()
        } else {
            (t as usize).min(self.path.len() - 1)
        };
        Some(self.path[index])
    }

    /// Largest Manhattan extent between any two route cells
    pub fn span(&self) -> u32 {
        let mut span = 0;
        for (i, a) in self.path.iter().enumerate() {
            for b in &self.path[i + 1..] {
                span = span.max(a.manhattan_distance(b));
            }
        }
        span
    }
}

/// Spacetime tunnel from the carrying cell to `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiftData {
    pub target: Position3D,
    #[serde(default)]
    pub bidirectional: bool,
}

impl RiftData {
    pub fn one_way(target: Position3D) -> Self {
        Self {
            target,
            bidirectional: false,
        }
    }

    pub fn bidirectional(target: Position3D) -> Self {
        Self {
            target,
            bidirectional: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patrol_position_loops() {
        let patrol = PatrolData::new(vec![Position2D::new(0, 0), Position2D::new(1, 0)], true);
        assert_eq!(patrol.position_at(0), Some(Position2D::new(0, 0)));
        assert_eq!(patrol.position_at(1), Some(Position2D::new(1, 0)));
        assert_eq!(patrol.position_at(2), Some(Position2D::new(0, 0)));
    }

    #[test]
    fn test_patrol_position_holds_without_loop() {
        let patrol = PatrolData::new(vec![Position2D::new(0, 0), Position2D::new(1, 0)], false);
        assert_eq!(patrol.position_at(5), Some(Position2D::new(1, 0)));
    }

    #[test]
    fn test_empty_patrol_has_no_position() {
        let patrol = PatrolData::new(Vec::new(), true);
        assert_eq!(patrol.position_at(0), None);
        assert_eq!(patrol.span(), 0);
    }

    #[test]
    fn test_patrol_span() {
        let patrol = PatrolData::new(
            vec![Position2D::new(1, 1), Position2D::new(4, 1), Position2D::new(4, 3)],
            true,
        );
        assert_eq!(patrol.span(), 5);
    }

    #[test]
    fn test_component_json_shape() {
        let rift = Component::Rift(RiftData::bidirectional(Position3D::new(1, 2, 0)));
        let json = serde_json::to_string(&rift).unwrap();
        assert!(json.contains("\"kind\":\"rift\""));
        let back: Component = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rift);

        let wall: Component = serde_json::from_str(r#"{"kind":"blocks_movement"}"#).unwrap();
        assert_eq!(wall, Component::BlocksMovement);
    }
}
