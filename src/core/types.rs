//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for placed objects
///
/// Ordered so that every iteration over objects is canonical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Turn counter (one per committed action)
pub type Turn = usize;

/// A cell in the space-time cube
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position3D {
    pub x: i32,
    pub y: i32,
    pub t: i32,
}

impl Position3D {
    pub const fn new(x: i32, y: i32, t: i32) -> Self {
        Self { x, y, t }
    }

    pub const fn spatial(&self) -> Position2D {
        Position2D::new(self.x, self.y)
    }

    /// Shift one cell in `dir` and advance time by one (a standard step)
    pub const fn step(&self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy, self.t + 1)
    }

    /// Same cell, next slice
    pub const fn tick(&self) -> Self {
        Self::new(self.x, self.y, self.t + 1)
    }

    /// Shift one cell in `dir` without touching time
    pub const fn shifted(&self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy, self.t)
    }

    /// Spatial Manhattan distance (ignores t)
    pub fn manhattan_distance(&self, other: &Position3D) -> u32 {
        self.spatial().manhattan_distance(&other.spatial())
    }
}

impl fmt::Display for Position3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, t={})", self.x, self.y, self.t)
    }
}

/// A cell on a single time slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position2D {
    pub x: i32,
    pub y: i32,
}

impl Position2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn at_time(&self, t: i32) -> Position3D {
        Position3D::new(self.x, self.y, t)
    }

    pub fn manhattan_distance(&self, other: &Position2D) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }
}

impl fmt::Display for Position2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal directions (no diagonals)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North, // y - 1
    South, // y + 1
    East,  // x + 1
    West,  // x - 1
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub const fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub const fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

/// Board dimensions: spatial extent plus number of time slices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardGeometry {
    pub width: i32,
    pub height: i32,
    pub time_depth: i32,
}

impl BoardGeometry {
    pub const fn new(width: i32, height: i32, time_depth: i32) -> Self {
        Self {
            width,
            height,
            time_depth,
        }
    }

    pub fn contains_spatial(&self, pos: Position2D) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn contains(&self, pos: Position3D) -> bool {
        self.contains_spatial(pos.spatial()) && pos.t >= 0 && pos.t < self.time_depth
    }

    /// Number of spatial cells on one slice
    pub fn area(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_moves_and_ticks() {
        let pos = Position3D::new(1, 2, 3);
        assert_eq!(pos.step(Direction::East), Position3D::new(2, 2, 4));
        assert_eq!(pos.step(Direction::North), Position3D::new(1, 1, 4));
        assert_eq!(pos.tick(), Position3D::new(1, 2, 4));
    }

    #[test]
    fn test_manhattan_ignores_time() {
        let a = Position3D::new(0, 0, 0);
        let b = Position3D::new(3, 4, 9);
        assert_eq!(a.manhattan_distance(&b), 7);
    }

    #[test]
    fn test_direction_opposite() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn test_board_contains() {
        let board = BoardGeometry::new(4, 3, 5);
        assert!(board.contains(Position3D::new(3, 2, 4)));
        assert!(!board.contains(Position3D::new(4, 2, 0)));
        assert!(!board.contains(Position3D::new(0, 0, 5)));
        assert!(!board.contains(Position3D::new(-1, 0, 0)));
        assert_eq!(board.area(), 12);
    }

    #[test]
    fn test_object_ids_sort_lexically() {
        let mut ids = vec![
            ObjectId::new("wall-1"),
            ObjectId::new("box-0"),
            ObjectId::new("exit-0"),
        ];
        ids.sort();
        assert_eq!(ids[0].as_str(), "box-0");
        assert_eq!(ids[2].as_str(), "wall-1");
    }
}
