use serde::{Deserialize, Serialize};

use crate::interaction::actions::Action;

/// Verdict and path-level metrics of one search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvabilityReport {
    pub solved: bool,
    pub shortest_path_length: Option<usize>,
    pub visited_nodes: usize,
    /// Dead-end nodes over visited nodes; 0 when nothing was visited
    pub dead_end_ratio: f64,
    pub required_rift_count: u32,
    pub required_push_pull_count: u32,
    pub enemy_exposure_events: u32,
    /// Winning action sequence, empty when unsolved
    #[serde(default)]
    pub solution: Vec<Action>,
}

impl SolvabilityReport {
    /// The level could not even be set up for search
    pub fn not_started() -> Self {
        Self::unsolved(0, 0)
    }

    pub fn unsolved(visited_nodes: usize, dead_ends: usize) -> Self {
        Self {
            solved: false,
            shortest_path_length: None,
            visited_nodes,
            dead_end_ratio: ratio(dead_ends, visited_nodes),
            required_rift_count: 0,
            required_push_pull_count: 0,
            enemy_exposure_events: 0,
            solution: Vec::new(),
        }
    }
}

pub(crate) fn ratio(dead_ends: usize, visited_nodes: usize) -> f64 {
    if visited_nodes == 0 {
        0.0
    } else {
        dead_ends as f64 / visited_nodes as f64
    }
}
