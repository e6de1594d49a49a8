//! Enemy detection
//!
//! Two sensing models. Delayed sensing: an enemy at evaluation time `t` sees
//! where the player is now from where the enemy itself stood at
//! `t - delay_turns`. Light cone: the player's cell at `t` is seen by any
//! later enemy position within `light_speed` cells per elapsed slice. Events
//! are collected for every enemy in id order; the state counts as detected
//! when any event fired.

use serde::{Deserialize, Serialize};

use crate::core::types::{ObjectId, Position2D, Position3D};
use crate::level::record::DetectionRules;
use crate::spacetime::time_cube::{CubeObject, TimeCube};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetectionModel {
    #[default]
    DelayedSensing,
    /// Sight travels `light_speed` cells per slice, forward in time only
    LightCone { light_speed: u32 },
}

/// Per-enemy sensing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionProfile {
    pub enabled: bool,
    pub model: DetectionModel,
    /// Sensing lag in slices (delayed sensing only)
    pub delay_turns: u32,
    /// Manhattan radius, inclusive
    pub max_distance: u32,
    /// When set, a vision blocker between enemy and player hides the player
    pub line_of_sight: bool,
}

impl Default for DetectionProfile {
    fn default() -> Self {
        Self {
            enabled: true,
            model: DetectionModel::DelayedSensing,
            delay_turns: 2,
            max_distance: 8,
            line_of_sight: false,
        }
    }
}

impl DetectionProfile {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub enemy_id: ObjectId,
    /// Where the enemy stood on the slice it saw the player from
    pub enemy_position: Position3D,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub events: Vec<DetectionEvent>,
}

impl DetectionReport {
    pub fn detected(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Evaluate every enemy against the player's current position
pub fn evaluate_detection(
    cube: &TimeCube,
    rules: &DetectionRules,
    player: Position3D,
) -> DetectionReport {
    let mut events = Vec::new();

    for enemy in cube.objects().filter(|o| o.is_enemy()) {
        let profile = rules.resolve(&enemy.id);
        if !profile.enabled {
            continue;
        }

        let sighting = match profile.model {
            DetectionModel::DelayedSensing => delayed_sighting(cube, enemy, &profile, player),
            DetectionModel::LightCone { light_speed } => {
                light_cone_sighting(cube, enemy, &profile, light_speed, player)
            }
        };
        if let Some(enemy_position) = sighting {
            events.push(DetectionEvent {
                enemy_id: enemy.id.clone(),
                enemy_position,
            });
        }
    }

    DetectionReport { events }
}

fn delayed_sighting(
    cube: &TimeCube,
    enemy: &CubeObject,
    profile: &DetectionProfile,
    player: Position3D,
) -> Option<Position3D> {
    let sensing_t = player.t - profile.delay_turns as i32;
    if sensing_t < 0 {
        return None;
    }
    let enemy_cell = enemy.position_at(sensing_t)?;
    in_view(cube, profile, enemy_cell, player.spatial(), sensing_t)
        .then(|| enemy_cell.at_time(sensing_t))
}

/// Earliest later slice on which the enemy stands inside the player's cone
///
/// Patrols are fixed for the whole cube, so a sighting on a slice the player
/// has not reached yet is already certain.
fn light_cone_sighting(
    cube: &TimeCube,
    enemy: &CubeObject,
    profile: &DetectionProfile,
    light_speed: u32,
    player: Position3D,
) -> Option<Position3D> {
    let player_cell = player.spatial();
    (player.t + 1..cube.time_depth()).find_map(|te| {
        let enemy_cell = enemy.position_at(te)?;
        let reach = light_speed.saturating_mul((te - player.t) as u32);
        let inside = enemy_cell.manhattan_distance(&player_cell) <= reach
            && in_view(cube, profile, enemy_cell, player_cell, te);
        inside.then(|| enemy_cell.at_time(te))
    })
}

fn in_view(
    cube: &TimeCube,
    profile: &DetectionProfile,
    enemy_cell: Position2D,
    player_cell: Position2D,
    t: i32,
) -> bool {
    enemy_cell.manhattan_distance(&player_cell) <= profile.max_distance
        && !(profile.line_of_sight && is_line_blocked(cube, enemy_cell, player_cell, t))
}

/// True when a vision blocker sits strictly between the two cells on slice `t`
pub fn is_line_blocked(cube: &TimeCube, from: Position2D, to: Position2D, t: i32) -> bool {
    let line = bresenham_line(from, to);
    if line.len() <= 2 {
        return false;
    }
    line[1..line.len() - 1]
        .iter()
        .any(|cell| cube.blocks_vision(cell.at_time(t)))
}

/// Cells on the rasterized line from `from` to `to`, endpoints included
pub fn bresenham_line(from: Position2D, to: Position2D) -> Vec<Position2D> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };

    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);
    let mut cells = Vec::with_capacity((dx - dy) as usize + 1);

    loop {
        cells.push(Position2D::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::builder::LevelBuilder;

    fn profile(delay: u32, distance: u32, line_of_sight: bool) -> DetectionProfile {
        DetectionProfile {
            enabled: true,
            model: DetectionModel::DelayedSensing,
            delay_turns: delay,
            max_distance: distance,
            line_of_sight,
        }
    }

    fn light_cone(light_speed: u32, distance: u32) -> DetectionProfile {
        DetectionProfile {
            model: DetectionModel::LightCone { light_speed },
            max_distance: distance,
            ..DetectionProfile::default()
        }
    }

    #[test]
    fn test_bresenham_straight_and_diagonal() {
        let line = bresenham_line(Position2D::new(0, 0), Position2D::new(3, 0));
        assert_eq!(line.len(), 4);
        let diag = bresenham_line(Position2D::new(0, 0), Position2D::new(2, 2));
        assert_eq!(
            diag,
            vec![Position2D::new(0, 0), Position2D::new(1, 1), Position2D::new(2, 2)]
        );
        assert_eq!(bresenham_line(Position2D::new(1, 1), Position2D::new(1, 1)).len(), 1);
    }

    #[test]
    fn test_delay_skips_early_slices() {
        let level = LevelBuilder::new("d", 6, 1, 6)
            .sentry(3, 0)
            .fallback_detection(profile(2, 5, false))
            .build();
        let cube = level.build_cube().unwrap();
        assert!(!evaluate_detection(&cube, &level.detection, Position3D::new(0, 0, 1)).detected());

        let report = evaluate_detection(&cube, &level.detection, Position3D::new(0, 0, 2));
        assert_eq!(report.len(), 1);
        assert_eq!(report.events[0].enemy_id.as_str(), "guard-0");
        assert_eq!(report.events[0].enemy_position, Position3D::new(3, 0, 0));
    }

    #[test]
    fn test_sensing_uses_lagged_enemy_position() {
        // Guard walks away along the row; at t=3 with delay 2 it reports from t=1
        let route = vec![
            Position2D::new(1, 0),
            Position2D::new(2, 0),
            Position2D::new(3, 0),
            Position2D::new(4, 0),
        ];
        let level = LevelBuilder::new("lag", 6, 1, 6)
            .patrol(1, 0, route, false)
            .fallback_detection(profile(2, 1, false))
            .build();
        let cube = level.build_cube().unwrap();
        let report = evaluate_detection(&cube, &level.detection, Position3D::new(1, 0, 3));
        assert_eq!(report.events[0].enemy_position, Position3D::new(2, 0, 1));
        assert!(!evaluate_detection(&cube, &level.detection, Position3D::new(0, 0, 4)).detected());
    }

    #[test]
    fn test_out_of_range_and_disabled() {
        let level = LevelBuilder::new("r", 8, 1, 4)
            .sentry(7, 0)
            .fallback_detection(profile(0, 3, false))
            .build();
        let cube = level.build_cube().unwrap();
        assert!(!evaluate_detection(&cube, &level.detection, Position3D::new(0, 0, 0)).detected());
        assert!(evaluate_detection(&cube, &level.detection, Position3D::new(4, 0, 0)).detected());

        let mut quiet = level.detection.clone();
        quiet.fallback = DetectionProfile::disabled();
        assert!(!evaluate_detection(&cube, &quiet, Position3D::new(6, 0, 0)).detected());
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let level = LevelBuilder::new("los", 5, 1, 3)
            .sentry(4, 0)
            .wall(2, 0)
            .fallback_detection(profile(0, 6, true))
            .build();
        let cube = level.build_cube().unwrap();
        assert!(!evaluate_detection(&cube, &level.detection, Position3D::new(0, 0, 1)).detected());
        assert!(evaluate_detection(&cube, &level.detection, Position3D::new(3, 0, 1)).detected());

        let mut open = level.detection.clone();
        open.fallback.line_of_sight = false;
        assert!(evaluate_detection(&cube, &open, Position3D::new(0, 0, 1)).detected());
    }

    #[test]
    fn test_light_cone_reaches_later_slices_only() {
        // Sentry four cells away; at one cell per slice it sees the player's
        // cell from four slices later
        let level = LevelBuilder::new("cone", 6, 1, 8)
            .sentry(4, 0)
            .fallback_detection(light_cone(1, 8))
            .build();
        let cube = level.build_cube().unwrap();

        let report = evaluate_detection(&cube, &level.detection, Position3D::new(0, 0, 2));
        assert_eq!(report.len(), 1);
        assert_eq!(report.events[0].enemy_position, Position3D::new(4, 0, 6));

        // Too late in the cube for the cone to arrive
        assert!(!evaluate_detection(&cube, &level.detection, Position3D::new(0, 0, 4)).detected());
    }

    #[test]
    fn test_light_cone_speed_and_radius() {
        let fast = LevelBuilder::new("fast", 6, 1, 4)
            .sentry(4, 0)
            .fallback_detection(light_cone(4, 8))
            .build();
        let cube = fast.build_cube().unwrap();
        let report = evaluate_detection(&cube, &fast.detection, Position3D::new(0, 0, 0));
        assert_eq!(report.events[0].enemy_position, Position3D::new(4, 0, 1));

        let mut short = fast.detection.clone();
        short.fallback = light_cone(4, 3);
        assert!(!evaluate_detection(&cube, &short, Position3D::new(0, 0, 0)).detected());
    }

    #[test]
    fn test_model_parses_from_toml() {
        let profile: DetectionProfile =
            toml::from_str("max_distance = 5\nmodel = { type = \"light_cone\", light_speed = 3 }\n")
                .unwrap();
        assert_eq!(profile.model, DetectionModel::LightCone { light_speed: 3 });
        assert_eq!(profile.delay_turns, 2);

        let plain: DetectionProfile = toml::from_str("max_distance = 5\n").unwrap();
        assert_eq!(plain.model, DetectionModel::DelayedSensing);
    }
}
