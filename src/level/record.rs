//! Validated level records and their bootstrap into a time cube
//!
//! A record is pure data: board, start, archetypes, placed instances, the
//! detection block and rule defaults. Loading never checks structure; that is
//! the validator's job (see `level::validation`).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::RuleDefaults;
use crate::core::types::{BoardGeometry, ObjectId, Position3D};
use crate::interaction::detection::DetectionProfile;
use crate::spacetime::archetype::{resolve_components, Archetype, ComponentSet, ObjectInstance};
use crate::spacetime::components::{Component, RiftData};
use crate::spacetime::time_cube::{CubeError, CubeObject, TimeCube};

#[derive(Error, Debug)]
pub enum LevelError {
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unsupported level file extension: {0}")]
    UnsupportedFormat(String),

    #[error("Object {object} references unknown archetype '{archetype}'")]
    UnknownArchetype { object: ObjectId, archetype: String },

    #[error("Level cannot be placed into a cube: {0}")]
    Bootstrap(#[from] CubeError),
}

/// Detection block of a level
///
/// Resolution for a given enemy: its assignment, then the default profile,
/// then `fallback`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionRules {
    /// Named profiles referenced by `default_profile` and `assignments`
    pub profiles: BTreeMap<String, DetectionProfile>,
    pub default_profile: Option<String>,
    /// Enemy instance id -> profile name
    pub assignments: BTreeMap<ObjectId, String>,
    /// Used when neither an assignment nor a default profile resolves
    pub fallback: DetectionProfile,
}

impl DetectionRules {
    /// The profile in force for one enemy instance
    pub fn resolve(&self, enemy: &ObjectId) -> DetectionProfile {
        self.assignments
            .get(enemy)
            .and_then(|name| self.profiles.get(name))
            .or_else(|| {
                self.default_profile
                    .as_ref()
                    .and_then(|name| self.profiles.get(name))
            })
            .copied()
            .unwrap_or(self.fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub board: BoardGeometry,
    pub start: Position3D,
    #[serde(default)]
    pub archetypes: Vec<Archetype>,
    #[serde(default)]
    pub objects: Vec<ObjectInstance>,
    #[serde(default)]
    pub detection: DetectionRules,
    #[serde(default)]
    pub rules: RuleDefaults,
}

impl LevelRecord {
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LevelError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a level file, picking the parser by extension (`.json` or `.toml`)
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            other => Err(LevelError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn to_json_string(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn archetype(&self, id: &str) -> Option<&Archetype> {
        self.archetypes.iter().find(|a| a.id == id)
    }

    /// Archetype components with the instance's overrides applied
    pub fn resolved_components(
        &self,
        instance: &ObjectInstance,
    ) -> Result<Vec<Component>, LevelError> {
        let archetype = self
            .archetype(&instance.archetype)
            .ok_or_else(|| LevelError::UnknownArchetype {
                object: instance.id.clone(),
                archetype: instance.archetype.clone(),
            })?;
        Ok(resolve_components(archetype, &instance.overrides))
    }

    /// Instances as cube objects, in id order
    pub fn cube_objects(&self) -> Result<Vec<CubeObject>, LevelError> {
        let mut objects = Vec::with_capacity(self.objects.len());
        for instance in &self.objects {
            let components = self.resolved_components(instance)?;
            let kind = self
                .archetype(&instance.archetype)
                .map(|a| a.kind.clone())
                .unwrap_or_default();
            objects.push(CubeObject::new(
                instance.id.clone(),
                instance.archetype.clone(),
                kind,
                instance.position,
                components,
            ));
        }
        objects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(objects)
    }

    /// Place every instance and lay out patrol routes
    pub fn build_cube(&self) -> Result<TimeCube, LevelError> {
        let mut cube = TimeCube::from_geometry(self.board);
        cube.place_objects(self.cube_objects()?)?;
        cube.project_patrols()?;
        Ok(cube)
    }

    /// Count instances whose resolved components satisfy `predicate`
    ///
    /// Instances with unknown archetypes are skipped.
    pub fn count_objects(&self, predicate: impl Fn(&ResolvedView<'_>) -> bool) -> usize {
        self.objects
            .iter()
            .filter_map(|instance| self.resolved_components(instance).ok())
            .filter(|components| predicate(&ResolvedView(components)))
            .count()
    }

    /// Rift components on placed instances, with their source cells
    pub fn rifts(&self) -> Vec<(Position3D, RiftData)> {
        self.objects
            .iter()
            .filter_map(|instance| {
                let components = self.resolved_components(instance).ok()?;
                ResolvedView(&components)
                    .rift()
                    .map(|rift| (instance.position, *rift))
            })
            .collect()
    }

    pub fn has_pushables(&self) -> bool {
        self.count_objects(|o| o.is_pushable()) > 0
    }

    pub fn has_pullables(&self) -> bool {
        self.count_objects(|o| o.is_pullable()) > 0
    }
}

/// Borrowed view over a resolved component list
pub struct ResolvedView<'a>(pub &'a [Component]);

impl ComponentSet for ResolvedView<'_> {
    fn components(&self) -> &[Component] {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Position2D;
    use crate::spacetime::components::PatrolData;

    fn sample() -> LevelRecord {
        LevelRecord {
            id: "sample".into(),
            title: String::new(),
            board: BoardGeometry::new(4, 4, 4),
            start: Position3D::new(0, 0, 0),
            archetypes: vec![
                Archetype::new(
                    "wall",
                    "wall",
                    vec![
                        Component::BlocksMovement,
                        Component::BlocksVision,
                        Component::TimePersistent,
                    ],
                ),
                Archetype::new("exit", "exit", vec![Component::Exit, Component::TimePersistent]),
            ],
            objects: vec![
                ObjectInstance::new("wall-0", "wall", Position3D::new(1, 1, 0)),
                ObjectInstance::new("exit-0", "exit", Position3D::new(3, 3, 0)),
            ],
            detection: DetectionRules::default(),
            rules: RuleDefaults::default(),
        }
    }

    #[test]
    fn test_build_cube_places_instances() {
        let cube = sample().build_cube().unwrap();
        assert!(cube.has_exit(Position3D::new(3, 3, 2)));
        assert!(cube.blocking_object_at(Position3D::new(1, 1, 3), &[]).is_some());
    }

    #[test]
    fn test_unknown_archetype_fails_bootstrap() {
        let mut level = sample();
        level.objects.push(ObjectInstance::new("ghost", "phantom", Position3D::new(2, 2, 0)));
        assert!(matches!(
            level.build_cube(),
            Err(LevelError::UnknownArchetype { .. })
        ));
    }

    #[test]
    fn test_overlapping_walls_fail_bootstrap() {
        let mut level = sample();
        level.objects.push(ObjectInstance::new("wall-1", "wall", Position3D::new(1, 1, 0)));
        assert!(matches!(level.build_cube(), Err(LevelError::Bootstrap(_))));
    }

    #[test]
    fn test_detection_resolution_order() {
        let close = DetectionProfile {
            max_distance: 1,
            ..DetectionProfile::default()
        };
        let far = DetectionProfile {
            max_distance: 6,
            ..DetectionProfile::default()
        };
        let mut rules = DetectionRules::default();
        rules.profiles.insert("close".into(), close);
        rules.profiles.insert("far".into(), far);
        assert_eq!(rules.resolve(&ObjectId::new("g")), DetectionProfile::default());

        rules.default_profile = Some("far".into());
        assert_eq!(rules.resolve(&ObjectId::new("g")), far);

        rules.assignments.insert(ObjectId::new("g"), "close".into());
        assert_eq!(rules.resolve(&ObjectId::new("g")), close);
        assert_eq!(rules.resolve(&ObjectId::new("h")), far);
    }

    #[test]
    fn test_json_round_trip_keeps_overrides() {
        let mut level = sample();
        level.archetypes.push(Archetype::new("guard", "enemy", vec![Component::TimePersistent]));
        level.objects.push(
            ObjectInstance::new("guard-0", "guard", Position3D::new(0, 3, 0)).with_override(
                Component::Patrol(PatrolData::new(
                    vec![Position2D::new(0, 3), Position2D::new(1, 3)],
                    true,
                )),
            ),
        );
        let json = level.to_json_string().unwrap();
        let back = LevelRecord::from_json_str(&json).unwrap();
        assert_eq!(back, level);
    }

    #[test]
    fn test_toml_level() {
        let content = r#"
id = "tiny"
start = { x = 0, y = 0, t = 0 }
board = { width = 3, height = 1, time_depth = 4 }

[[archetypes]]
id = "exit"
kind = "exit"
components = [{ kind = "exit" }, { kind = "time_persistent" }]

[[objects]]
id = "exit-0"
archetype = "exit"
position = { x = 2, y = 0, t = 0 }

[rules]
max_push_chain = 2
"#;
        let level = LevelRecord::from_toml_str(content).unwrap();
        assert_eq!(level.rules.max_push_chain, 2);
        assert!(level.build_cube().unwrap().has_exit(Position3D::new(2, 0, 3)));
    }
}
