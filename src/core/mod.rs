pub mod config;
pub mod error;
pub mod types;

pub use config::{RiftRules, RuleDefaults};
pub use error::{ForgeError, Result};
pub use types::{BoardGeometry, Direction, ObjectId, Position2D, Position3D, Turn};
