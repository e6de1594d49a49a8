//! Search bounds and action-set switches

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Deepest turn count a path may reach
    pub max_depth: usize,
    /// States dequeued before the search gives up
    pub max_nodes: usize,
    /// Offer push/pull actions (and implicit pushes on move)
    pub include_push_pull: bool,
    /// Offer rift actions
    pub include_rifts: bool,
    /// Discard successors that are detected
    ///
    /// When off, detected states stay in the search and their events add to
    /// the path's exposure count.
    pub prune_detected: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_depth: 40,
            max_nodes: 50_000,
            include_push_pull: true,
            include_rifts: true,
            prune_detected: true,
        }
    }
}

impl SolverOptions {
    /// A bounded preset, everything else left at defaults
    pub fn bounded(max_depth: usize, max_nodes: usize) -> Self {
        Self {
            max_depth,
            max_nodes,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("max_depth must be at least 1".into());
        }
        if self.max_nodes == 0 {
            return Err("max_nodes must be at least 1".into());
        }
        Ok(())
    }
}
