//! Bounded solvability search

pub mod options;
pub mod report;
pub mod search;

pub use options::SolverOptions;
pub use report::SolvabilityReport;
pub use search::{evaluate_solvability, state_signature};
