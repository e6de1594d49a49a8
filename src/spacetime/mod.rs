//! Spacetime store: the time-indexed grid and the player's world line

pub mod archetype;
pub mod components;
pub mod time_cube;
pub mod world_line;

pub use archetype::{resolve_components, Archetype, ComponentSet, ObjectInstance, RenderHints};
pub use components::{Component, ComponentKind, PatrolData, RiftData};
pub use time_cube::{CubeError, CubeObject, Relocation, TimeCube};
pub use world_line::{WorldLine, WorldLineEntry, WorldLineError};
