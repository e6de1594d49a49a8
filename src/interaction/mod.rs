//! Game interaction: state, the transition function and detection

pub mod actions;
pub mod detection;
pub mod state;

pub use actions::{
    execute, play, rift_targets, Action, ActionError, ActionOutcome, Effect, RiftInstruction,
};
pub use detection::{
    bresenham_line, evaluate_detection, is_line_blocked, DetectionEvent, DetectionModel,
    DetectionProfile, DetectionReport,
};
pub use state::{InteractionState, Phase, ResourcePools};
