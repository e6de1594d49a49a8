//! Seeded candidate construction
//!
//! One attempt = one `ChaCha8Rng` stream derived from `(seed, attempt)`.
//! All cell lists are built in row-major order before shuffling, so the
//! same stream always yields the same level.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::types::{Direction, Position2D, Position3D};
use crate::generation::profile::{
    GenerationProfile, PatrolPathOrder, PlacementBudgets, WallCountStrategy,
};
use crate::generation::request::GenerationRequest;
use crate::level::builder::LevelBuilder;
use crate::level::record::LevelRecord;

/// Stream for one attempt
pub fn attempt_rng(seed: u64, attempt: u32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(splitmix64(seed ^ splitmix64(attempt as u64)))
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Build one candidate level
pub fn build_candidate(
    request: &GenerationRequest,
    profile: &GenerationProfile,
    budgets: PlacementBudgets,
    attempt: u32,
    rng: &mut ChaCha8Rng,
) -> LevelRecord {
    let board = request.board;
    let mut free: Vec<Position2D> = (0..board.height)
        .flat_map(|y| (0..board.width).map(move |x| Position2D::new(x, y)))
        .collect();
    free.shuffle(rng);

    // Start first, then the farthest-leaning exit: any cell at least half the
    // board's semi-perimeter away, else the farthest cell
    let start = free.remove(0);
    let min_gap = ((board.width + board.height) / 2).max(1) as u32;
    let exit_index = free
        .iter()
        .position(|c| c.manhattan_distance(&start) >= min_gap)
        .unwrap_or_else(|| farthest_index(&free, start));
    let exit = free.remove(exit_index);

    let id = format!("gen-{}-{}", request.seed, attempt);
    let mut builder = LevelBuilder::new(id, board.width, board.height, board.time_depth)
        .start(start.x, start.y)
        .exit(exit.x, exit.y)
        .rules(profile.rules)
        .fallback_detection(profile.detection);

    let wall_count = match profile.wall_strategy {
        WallCountStrategy::Fixed => budgets.walls,
        WallCountStrategy::Random => rng.gen_range(0..=budgets.walls),
    };
    let mut walls = BTreeSet::new();
    for _ in 0..wall_count {
        let Some(cell) = free.pop() else { break };
        walls.insert(cell);
        builder = builder.wall(cell.x, cell.y);
    }

    let mut solid = walls.clone();
    if request.features.boxes {
        for _ in 0..budgets.boxes {
            let Some(cell) = free.pop() else { break };
            solid.insert(cell);
            builder = builder.pushable(cell.x, cell.y);
        }
    }

    if request.features.enemies {
        let safe_distance = profile.detection.max_distance + profile.patrol_length + 1;
        for _ in 0..budgets.enemies {
            let Some(index) = free
                .iter()
                .rposition(|c| c.manhattan_distance(&start) > safe_distance)
            else {
                break;
            };
            let cell = free.remove(index);
            let mix = profile.behavior_mix;
            let stationary = rng.gen_range(0..mix.total()) < mix.stationary;
            let route = if stationary {
                vec![cell]
            } else {
                patrol_route(cell, &solid, request, profile, rng)
            };
            builder = builder.patrol(cell.x, cell.y, route, true);
        }
    }

    if request.features.rifts {
        for _ in 0..budgets.rifts {
            let Some(source) = free.pop() else { break };
            let open: Vec<Position2D> = free
                .iter()
                .copied()
                .filter(|c| !solid.contains(c))
                .collect();
            let Some(cell) = open.choose(rng).copied() else {
                break;
            };
            let target = Position3D::new(cell.x, cell.y, rng.gen_range(0..board.time_depth));
            let bidirectional = rng.gen_bool(0.5);
            builder = builder.rift(source.x, source.y, target, bidirectional);
        }
    }

    builder.build()
}

fn farthest_index(cells: &[Position2D], from: Position2D) -> usize {
    cells
        .iter()
        .enumerate()
        .max_by_key(|(i, c)| (c.manhattan_distance(&from), std::cmp::Reverse(*i)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Straight segment from `origin` in a random direction, stopping at solids
fn patrol_route(
    origin: Position2D,
    solid: &BTreeSet<Position2D>,
    request: &GenerationRequest,
    profile: &GenerationProfile,
    rng: &mut ChaCha8Rng,
) -> Vec<Position2D> {
    let dir = *Direction::ALL.choose(rng).unwrap_or(&Direction::East);
    let (dx, dy) = dir.delta();

    let mut segment = vec![origin];
    let mut cell = origin;
    for _ in 1..profile.patrol_length.max(1) {
        let next = Position2D::new(cell.x + dx, cell.y + dy);
        if !request.board.contains_spatial(next) || solid.contains(&next) {
            break;
        }
        segment.push(next);
        cell = next;
    }

    match profile.patrol_order {
        PatrolPathOrder::Forward => segment,
        PatrolPathOrder::PingPong => {
            let back: Vec<Position2D> = segment
                .iter()
                .rev()
                .skip(1)
                .take(segment.len().saturating_sub(2))
                .copied()
                .collect();
            segment.extend(back);
            segment
        }
    }
}
