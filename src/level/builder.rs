//! Fluent construction of level records
//!
//! Used by the generator and by tests. Objects get ids of the form
//! `<archetype>-<n>`, numbered per archetype in insertion order.

use std::collections::BTreeMap;

use crate::core::config::RuleDefaults;
use crate::core::types::{BoardGeometry, ObjectId, Position2D, Position3D};
use crate::interaction::detection::DetectionProfile;
use crate::level::record::{DetectionRules, LevelRecord};
use crate::spacetime::archetype::{Archetype, ObjectInstance};
use crate::spacetime::components::{Component, PatrolData, RiftData};

pub const WALL: &str = "wall";
pub const EXIT: &str = "exit";
pub const BOX: &str = "box";
pub const CRATE: &str = "crate";
pub const GUARD: &str = "guard";
pub const RIFT: &str = "rift";

/// The archetype set every built level draws from
pub fn standard_archetype(id: &str) -> Option<Archetype> {
    let archetype = match id {
        WALL => Archetype::new(
            WALL,
            "wall",
            vec![Component::BlocksMovement, Component::BlocksVision, Component::TimePersistent],
        )
        .with_glyph("#"),
        EXIT => Archetype::new(EXIT, "exit", vec![Component::Exit, Component::TimePersistent])
            .with_glyph(">"),
        BOX => Archetype::new(
            BOX,
            "box",
            vec![Component::BlocksMovement, Component::Pushable, Component::TimePersistent],
        )
        .with_glyph("b"),
        // Pushable too, so a crate in a corridor is never a hard lock
        CRATE => Archetype::new(
            CRATE,
            "box",
            vec![
                Component::BlocksMovement,
                Component::Pushable,
                Component::Pullable,
                Component::TimePersistent,
            ],
        )
        .with_glyph("c"),
        GUARD => Archetype::new(GUARD, "enemy", vec![Component::TimePersistent]).with_glyph("E"),
        RIFT => Archetype::new(RIFT, "rift", vec![Component::TimePersistent]).with_glyph("@"),
        _ => return None,
    };
    Some(archetype)
}

#[derive(Debug, Clone)]
pub struct LevelBuilder {
    record: LevelRecord,
    counters: BTreeMap<String, usize>,
}

impl LevelBuilder {
    pub fn new(id: impl Into<String>, width: i32, height: i32, time_depth: i32) -> Self {
        Self {
            record: LevelRecord {
                id: id.into(),
                title: String::new(),
                board: BoardGeometry::new(width, height, time_depth),
                start: Position3D::new(0, 0, 0),
                archetypes: Vec::new(),
                objects: Vec::new(),
                detection: DetectionRules::default(),
                rules: RuleDefaults::default(),
            },
            counters: BTreeMap::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.record.title = title.into();
        self
    }

    /// Start cell on slice 0
    pub fn start(self, x: i32, y: i32) -> Self {
        self.start_at(Position3D::new(x, y, 0))
    }

    pub fn start_at(mut self, position: Position3D) -> Self {
        self.record.start = position;
        self
    }

    pub fn rules(mut self, rules: RuleDefaults) -> Self {
        self.record.rules = rules;
        self
    }

    pub fn wall(self, x: i32, y: i32) -> Self {
        self.place(WALL, Position3D::new(x, y, 0), Vec::new())
    }

    /// A wall across the full board width
    pub fn wall_row(mut self, y: i32) -> Self {
        for x in 0..self.record.board.width {
            self = self.wall(x, y);
        }
        self
    }

    pub fn exit(self, x: i32, y: i32) -> Self {
        self.place(EXIT, Position3D::new(x, y, 0), Vec::new())
    }

    pub fn pushable(self, x: i32, y: i32) -> Self {
        self.place(BOX, Position3D::new(x, y, 0), Vec::new())
    }

    pub fn pullable(self, x: i32, y: i32) -> Self {
        self.place(CRATE, Position3D::new(x, y, 0), Vec::new())
    }

    pub fn patrol(self, x: i32, y: i32, path: Vec<Position2D>, loops: bool) -> Self {
        self.place(
            GUARD,
            Position3D::new(x, y, 0),
            vec![Component::Patrol(PatrolData::new(path, loops))],
        )
    }

    /// A guard that never moves
    pub fn sentry(self, x: i32, y: i32) -> Self {
        self.patrol(x, y, vec![Position2D::new(x, y)], true)
    }

    pub fn rift(self, x: i32, y: i32, target: Position3D, bidirectional: bool) -> Self {
        self.place(
            RIFT,
            Position3D::new(x, y, 0),
            vec![Component::Rift(RiftData {
                target,
                bidirectional,
            })],
        )
    }

    pub fn detection_profile(mut self, name: impl Into<String>, profile: DetectionProfile) -> Self {
        self.record.detection.profiles.insert(name.into(), profile);
        self
    }

    pub fn default_detection(mut self, name: impl Into<String>) -> Self {
        self.record.detection.default_profile = Some(name.into());
        self
    }

    pub fn assign_detection(mut self, enemy: &str, profile: impl Into<String>) -> Self {
        self.record
            .detection
            .assignments
            .insert(ObjectId::new(enemy), profile.into());
        self
    }

    pub fn fallback_detection(mut self, profile: DetectionProfile) -> Self {
        self.record.detection.fallback = profile;
        self
    }

    /// Place an instance of a custom archetype
    pub fn custom(
        mut self,
        archetype: Archetype,
        position: Position3D,
        overrides: Vec<Component>,
    ) -> Self {
        if self.record.archetype(&archetype.id).is_none() {
            self.record.archetypes.push(archetype.clone());
        }
        self.push_instance(&archetype.id, position, overrides);
        self
    }

    fn place(
        mut self,
        archetype_id: &str,
        position: Position3D,
        overrides: Vec<Component>,
    ) -> Self {
        if self.record.archetype(archetype_id).is_none() {
            if let Some(archetype) = standard_archetype(archetype_id) {
                self.record.archetypes.push(archetype);
            }
        }
        self.push_instance(archetype_id, position, overrides);
        self
    }

    fn push_instance(
        &mut self,
        archetype_id: &str,
        position: Position3D,
        overrides: Vec<Component>,
    ) {
        let counter = self.counters.entry(archetype_id.to_string()).or_insert(0);
        let id = format!("{}-{}", archetype_id, counter);
        *counter += 1;

        let mut instance = ObjectInstance::new(id, archetype_id, position);
        instance.overrides = overrides;
        self.record.objects.push(instance);
    }

    pub fn object_count(&self) -> usize {
        self.record.objects.len()
    }

    pub fn build(self) -> LevelRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spacetime::archetype::ComponentSet;

    #[test]
    fn test_ids_numbered_per_archetype() {
        let level = LevelBuilder::new("ids", 5, 5, 3)
            .wall(1, 1)
            .exit(4, 4)
            .wall(2, 1)
            .build();
        let ids: Vec<&str> = level.objects.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["wall-0", "exit-0", "wall-1"]);
        assert_eq!(level.archetypes.len(), 2);
    }

    #[test]
    fn test_wall_row_spans_width() {
        let level = LevelBuilder::new("row", 6, 6, 3).wall_row(2).build();
        assert_eq!(level.objects.len(), 6);
        assert!(level.objects.iter().all(|o| o.position.y == 2));
    }

    #[test]
    fn test_rift_override_resolves() {
        let level = LevelBuilder::new("rift", 4, 4, 4)
            .rift(0, 0, Position3D::new(2, 2, 1), true)
            .build();
        let rifts = level.rifts();
        assert_eq!(rifts.len(), 1);
        assert_eq!(rifts[0].0, Position3D::new(0, 0, 0));
        assert!(rifts[0].1.bidirectional);
    }

    #[test]
    fn test_standard_archetypes() {
        assert!(standard_archetype(WALL).unwrap().blocks_vision());
        assert!(standard_archetype(BOX).unwrap().is_pushable());
        assert!(!standard_archetype(BOX).unwrap().is_pullable());
        assert!(standard_archetype(CRATE).unwrap().is_pullable());
        assert!(standard_archetype("lava").is_none());
    }
}
