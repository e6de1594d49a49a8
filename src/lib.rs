//! Timecube Forge - certification, scoring and generation of time-rift puzzles

pub mod core;
pub mod difficulty;
pub mod generation;
pub mod interaction;
pub mod level;
pub mod solver;
pub mod spacetime;
