//! Archetype templates and placed instances

use serde::{Deserialize, Serialize};

use crate::core::types::{ObjectId, Position3D};
use crate::spacetime::components::{Component, PatrolData, RiftData};

/// Presentation hints; carried through but never read by the core
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderHints {
    #[serde(default)]
    pub glyph: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Named template: kind string plus an ordered component set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetype {
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub render: RenderHints,
}

impl Archetype {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, components: Vec<Component>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            components,
            render: RenderHints::default(),
        }
    }

    pub fn with_glyph(mut self, glyph: &str) -> Self {
        self.render.glyph = Some(glyph.to_string());
        self
    }
}

/// A placed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInstance {
    pub id: ObjectId,
    pub archetype: String,
    pub position: Position3D,
    /// Behavior-policy overrides (e.g. an assigned patrol route)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<Component>,
}

impl ObjectInstance {
    pub fn new(id: impl Into<String>, archetype: impl Into<String>, position: Position3D) -> Self {
        Self {
            id: ObjectId::new(id),
            archetype: archetype.into(),
            position,
            overrides: Vec::new(),
        }
    }

    pub fn with_override(mut self, component: Component) -> Self {
        self.overrides.push(component);
        self
    }
}

/// Merge an archetype's components with an instance's overrides
///
/// An override replaces the archetype component of the same kind in place;
/// kinds the archetype lacks are appended in override order.
pub fn resolve_components(archetype: &Archetype, overrides: &[Component]) -> Vec<Component> {
    let mut resolved = archetype.components.clone();
    for component in overrides {
        match resolved.iter_mut().find(|c| c.kind() == component.kind()) {
            Some(slot) => *slot = component.clone(),
            None => resolved.push(component.clone()),
        }
    }
    resolved
}

/// Component queries shared by cube objects and level instances
pub trait ComponentSet {
    fn components(&self) -> &[Component];

    fn has(&self, predicate: impl Fn(&Component) -> bool) -> bool {
        self.components().iter().any(predicate)
    }

    fn blocks_movement(&self) -> bool {
        self.has(|c| matches!(c, Component::BlocksMovement))
    }

    fn blocks_vision(&self) -> bool {
        self.has(|c| matches!(c, Component::BlocksVision))
    }

    fn is_time_persistent(&self) -> bool {
        self.has(|c| matches!(c, Component::TimePersistent))
    }

    fn is_exit(&self) -> bool {
        self.has(|c| matches!(c, Component::Exit))
    }

    fn is_pushable(&self) -> bool {
        self.has(|c| matches!(c, Component::Pushable))
    }

    fn is_pullable(&self) -> bool {
        self.has(|c| matches!(c, Component::Pullable))
    }

    fn patrol(&self) -> Option<&PatrolData> {
        self.components().iter().find_map(|c| match c {
            Component::Patrol(data) => Some(data),
            _ => None,
        })
    }

    fn rift(&self) -> Option<&RiftData> {
        self.components().iter().find_map(|c| match c {
            Component::Rift(data) => Some(data),
            _ => None,
        })
    }
}

impl ComponentSet for Archetype {
    fn components(&self) -> &[Component] {
        &self.components
    }
}
