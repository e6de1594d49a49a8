//! The time-indexed occupancy grid
//!
//! Each slice keeps its own spatial index (cell -> object ids); object
//! records keep a per-slice track. Both are updated together so that
//! `objects_at` is a single map lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::core::types::{BoardGeometry, ObjectId, Position2D, Position3D};
use crate::spacetime::archetype::ComponentSet;
use crate::spacetime::components::Component;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CubeError {
    #[error("Position {position} is outside a {width}x{height}x{time_depth} cube")]
    OutOfBounds {
        position: Position3D,
        width: i32,
        height: i32,
        time_depth: i32,
    },

    #[error("Object {0} placed twice")]
    DuplicateObject(ObjectId),

    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("Blocking conflict at {at}: {existing} and {incoming}")]
    Conflict {
        existing: ObjectId,
        incoming: ObjectId,
        at: Position3D,
    },
}

/// An object as stored in the cube
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeObject {
    pub id: ObjectId,
    pub archetype: String,
    pub kind: String,
    /// Where the object was authored
    pub origin: Position3D,
    components: Arc<[Component]>,
    /// Position per slice; None where the object is absent
    track: Vec<Option<Position2D>>,
}

impl CubeObject {
    pub fn new(
        id: ObjectId,
        archetype: impl Into<String>,
        kind: impl Into<String>,
        origin: Position3D,
        components: Vec<Component>,
    ) -> Self {
        Self {
            id,
            archetype: archetype.into(),
            kind: kind.into(),
            origin,
            components: components.into(),
            track: Vec::new(),
        }
    }

    pub fn position_at(&self, t: i32) -> Option<Position2D> {
        if t < 0 {
            return None;
        }
        self.track.get(t as usize).copied().flatten()
    }

    pub fn track(&self) -> &[Option<Position2D>] {
        &self.track
    }

    /// Patrollers always span the full time axis
    fn spans_all_slices(&self) -> bool {
        self.is_time_persistent() || self.patrol().is_some()
    }

    pub fn is_enemy(&self) -> bool {
        self.patrol().is_some() || self.kind == "enemy"
    }
}

impl ComponentSet for CubeObject {
    fn components(&self) -> &[Component] {
        &self.components
    }
}

/// One object's new cell, applied from some slice onward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub id: ObjectId,
    pub to: Position2D,
}

impl Relocation {
    pub fn new(id: ObjectId, to: Position2D) -> Self {
        Self { id, to }
    }
}

type SliceIndex = BTreeMap<Position2D, Vec<ObjectId>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeCube {
    geometry: BoardGeometry,
    slices: Vec<SliceIndex>,
    objects: BTreeMap<ObjectId, CubeObject>,
}

impl TimeCube {
    /// Create an empty cube; negative depth is treated as zero
    pub fn new(width: i32, height: i32, time_depth: i32) -> Self {
        let depth = time_depth.max(0);
        Self {
            geometry: BoardGeometry::new(width, height, depth),
            slices: vec![SliceIndex::new(); depth as usize],
            objects: BTreeMap::new(),
        }
    }

    pub fn from_geometry(geometry: BoardGeometry) -> Self {
        Self::new(geometry.width, geometry.height, geometry.time_depth)
    }

    pub fn geometry(&self) -> BoardGeometry {
        self.geometry
    }

    pub fn time_depth(&self) -> i32 {
        self.geometry.time_depth
    }

    pub fn in_bounds(&self, pos: Position3D) -> bool {
        self.geometry.contains(pos)
    }

    fn out_of_bounds(&self, position: Position3D) -> CubeError {
        CubeError::OutOfBounds {
            position,
            width: self.geometry.width,
            height: self.geometry.height,
            time_depth: self.geometry.time_depth,
        }
    }

    /// Place a batch of objects; nothing is committed unless all fit
    pub fn place_objects(
        &mut self,
        objects: impl IntoIterator<Item = CubeObject>,
    ) -> Result<(), CubeError> {
        let mut staged = self.clone();
        for object in objects {
            staged.place_one(object)?;
        }
        *self = staged;
        Ok(())
    }

    fn place_one(&mut self, mut object: CubeObject) -> Result<(), CubeError> {
        if !self.in_bounds(object.origin) {
            return Err(self.out_of_bounds(object.origin));
        }
        if self.objects.contains_key(&object.id) {
            return Err(CubeError::DuplicateObject(object.id));
        }

        let cell = object.origin.spatial();
        let depth = self.geometry.time_depth;
        object.track = (0..depth)
            .map(|t| {
                if object.spans_all_slices() || t == object.origin.t {
                    Some(cell)
                } else {
                    None
                }
            })
            .collect();

        for t in 0..depth {
            if object.track[t as usize].is_none() {
                continue;
            }
            if object.blocks_movement() {
                if let Some(existing) = self.blocking_object_at(cell.at_time(t), &[]) {
                    return Err(CubeError::Conflict {
                        existing: existing.id.clone(),
                        incoming: object.id.clone(),
                        at: cell.at_time(t),
                    });
                }
            }
            insert_sorted(self.slices[t as usize].entry(cell).or_default(), &object.id);
        }

        self.objects.insert(object.id.clone(), object);
        Ok(())
    }

    /// Move objects to new cells on every slice from `from_t` onward
    ///
    /// Bounds and blocking are checked on each affected slice before anything
    /// is written, so a failure leaves the cube untouched. Slices where an
    /// object is absent are skipped.
    pub fn apply_relocations_from_time(
        &mut self,
        from_t: i32,
        relocations: &[Relocation],
    ) -> Result<(), CubeError> {
        let start = from_t.max(0);
        for relocation in relocations {
            if !self.objects.contains_key(&relocation.id) {
                return Err(CubeError::ObjectNotFound(relocation.id.clone()));
            }
        }
        let moving: Vec<&ObjectId> = relocations.iter().map(|r| &r.id).collect();

        for t in start..self.geometry.time_depth {
            let mut landed: BTreeMap<Position2D, &ObjectId> = BTreeMap::new();
            for relocation in relocations {
                let object = &self.objects[&relocation.id];
                if object.position_at(t).is_none() {
                    continue;
                }
                let target = relocation.to.at_time(t);
                if !self.in_bounds(target) {
                    return Err(self.out_of_bounds(target));
                }
                if !object.blocks_movement() {
                    continue;
                }
                let stationary = self.objects_at(target).into_iter().find(|other| {
                    other.blocks_movement() && !moving.contains(&&other.id)
                });
                if let Some(existing) = stationary {
                    return Err(CubeError::Conflict {
                        existing: existing.id.clone(),
                        incoming: relocation.id.clone(),
                        at: target,
                    });
                }
                if let Some(existing) = landed.insert(relocation.to, &relocation.id) {
                    return Err(CubeError::Conflict {
                        existing: existing.clone(),
                        incoming: relocation.id.clone(),
                        at: target,
                    });
                }
            }
        }

        for relocation in relocations {
            for t in start..self.geometry.time_depth {
                let slot = t as usize;
                let Some(object) = self.objects.get_mut(&relocation.id) else {
                    continue;
                };
                let Some(previous) = object.track[slot] else {
                    continue;
                };
                object.track[slot] = Some(relocation.to);

                let index = &mut self.slices[slot];
                if let Some(ids) = index.get_mut(&previous) {
                    ids.retain(|id| id != &relocation.id);
                    if ids.is_empty() {
                        index.remove(&previous);
                    }
                }
                insert_sorted(index.entry(relocation.to).or_default(), &relocation.id);
            }
        }
        Ok(())
    }

    /// Lay every patroller's route onto the slices
    pub fn project_patrols(&mut self) -> Result<(), CubeError> {
        let patrollers: Vec<(ObjectId, Vec<Position2D>)> = self
            .objects
            .values()
            .filter_map(|object| {
                let patrol = object.patrol()?;
                let route = (0..self.geometry.time_depth)
                    .map(|t| patrol.position_at(t))
                    .collect::<Option<Vec<_>>>()?;
                Some((object.id.clone(), route))
            })
            .collect();
        if patrollers.is_empty() {
            return Ok(());
        }

        for t in 0..self.geometry.time_depth {
            let relocations: Vec<Relocation> = patrollers
                .iter()
                .map(|(id, route)| Relocation::new(id.clone(), route[t as usize]))
                .collect();
            self.apply_relocations_from_time(t, &relocations)?;
        }
        Ok(())
    }

    /// Objects occupying a cell, sorted by id
    pub fn objects_at(&self, pos: Position3D) -> Vec<&CubeObject> {
        if !self.in_bounds(pos) {
            return Vec::new();
        }
        self.slices[pos.t as usize]
            .get(&pos.spatial())
            .map(|ids| ids.iter().filter_map(|id| self.objects.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn has_exit(&self, pos: Position3D) -> bool {
        self.objects_at(pos).iter().any(|object| object.is_exit())
    }

    pub fn blocking_object_at(&self, pos: Position3D, ignore: &[ObjectId]) -> Option<&CubeObject> {
        self.objects_at(pos)
            .into_iter()
            .find(|object| object.blocks_movement() && !ignore.contains(&object.id))
    }

    pub fn blocks_vision(&self, pos: Position3D) -> bool {
        self.objects_at(pos).iter().any(|object| object.blocks_vision())
    }

    pub fn object(&self, id: &ObjectId) -> Option<&CubeObject> {
        self.objects.get(id)
    }

    /// All objects in id order
    pub fn objects(&self) -> impl Iterator<Item = &CubeObject> {
        self.objects.values()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

fn insert_sorted(ids: &mut Vec<ObjectId>, id: &ObjectId) {
    if let Err(index) = ids.binary_search(id) {
        ids.insert(index, id.clone());
    }
}
