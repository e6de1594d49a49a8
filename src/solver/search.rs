//! Bounded breadth-first solvability search
//!
//! States are deduplicated by a canonical string signature. Every frontier
//! entry owns a full `InteractionState`; object maps are ordered, so the
//! traversal order is the same on every run.

use std::collections::VecDeque;
use std::fmt::Write;

use ahash::AHashSet;
use tracing::{debug, warn};

use crate::core::types::Direction;
use crate::interaction::actions::{execute, rift_targets, Action};
use crate::interaction::state::InteractionState;
use crate::level::record::LevelRecord;
use crate::solver::options::SolverOptions;
use crate::solver::report::{ratio, SolvabilityReport};
use crate::spacetime::archetype::ComponentSet;

struct SearchNode {
    state: InteractionState,
    depth: usize,
    rift_uses: u32,
    push_pull_uses: u32,
    exposure: u32,
}

/// Static facts that gate the action set
#[derive(Debug, Clone, Copy)]
struct ActionGate {
    push: bool,
    pull: bool,
    rifts: bool,
}

/// Can the player reach an exit undetected within the bounds?
pub fn evaluate_solvability(level: &LevelRecord, options: &SolverOptions) -> SolvabilityReport {
    let mut start = match InteractionState::from_level(level) {
        Ok(state) => state,
        Err(e) => {
            warn!("Level {} cannot be bootstrapped for search: {}", level.id, e);
            return SolvabilityReport::not_started();
        }
    };
    if !options.include_push_pull {
        start.rules.push_on_move = false;
    }

    let start_detection = start.detect();
    if start_detection.detected() && options.prune_detected {
        debug!("Level {}: start position is already detected", level.id);
        // The start is visited and has no legal continuation
        return SolvabilityReport::unsolved(1, 1);
    }

    let gate = ActionGate {
        push: options.include_push_pull && level.has_pushables(),
        pull: options.include_push_pull && level.has_pullables() && start.rules.allow_pull,
        rifts: options.include_rifts,
    };

    let mut seen: AHashSet<String> = AHashSet::new();
    seen.insert(state_signature(&start));

    let mut frontier = VecDeque::new();
    frontier.push_back(SearchNode {
        state: start,
        depth: 0,
        rift_uses: 0,
        push_pull_uses: 0,
        exposure: start_detection.len() as u32,
    });

    let mut visited_nodes = 0;
    let mut dead_ends = 0;

    while visited_nodes < options.max_nodes {
        let Some(node) = frontier.pop_front() else {
            break;
        };
        visited_nodes += 1;

        if node.state.is_won() || node.state.on_exit() {
            debug!(
                "Level {} solved in {} turns after {} nodes",
                level.id, node.depth, visited_nodes
            );
            return SolvabilityReport {
                solved: true,
                shortest_path_length: Some(node.depth),
                visited_nodes,
                dead_end_ratio: ratio(dead_ends, visited_nodes),
                required_rift_count: node.rift_uses,
                required_push_pull_count: node.push_pull_uses,
                enemy_exposure_events: node.exposure,
                solution: node.state.history.clone(),
            };
        }

        // Depth-capped nodes are not expanded and not counted as dead ends
        if node.depth >= options.max_depth {
            continue;
        }

        let mut successors = 0;
        for action in candidate_actions(&node.state, gate) {
            let mut next = node.state.clone();
            let Ok(outcome) = execute(&mut next, action) else {
                continue;
            };
            let detection = next.detect();
            if detection.detected() && options.prune_detected {
                continue;
            }
            successors += 1;

            if !seen.insert(state_signature(&next)) {
                continue;
            }
            frontier.push_back(SearchNode {
                state: next,
                depth: node.depth + 1,
                rift_uses: node.rift_uses + u32::from(outcome.is_rift()),
                push_pull_uses: node.push_pull_uses + u32::from(outcome.is_push_pull()),
                exposure: node.exposure + detection.len() as u32,
            });
        }
        if successors == 0 {
            dead_ends += 1;
        }
    }

    debug!(
        "Level {} unsolved: {} nodes visited, {} dead ends, frontier {}",
        level.id,
        visited_nodes,
        dead_ends,
        frontier.len()
    );
    SolvabilityReport::unsolved(visited_nodes, dead_ends)
}

/// Actions tried from a state, in a fixed order
fn candidate_actions(state: &InteractionState, gate: ActionGate) -> Vec<Action> {
    let mut actions: Vec<Action> = Direction::ALL.iter().map(|d| Action::Move(*d)).collect();
    actions.push(Action::Wait);
    if gate.push {
        actions.extend(Direction::ALL.iter().map(|d| Action::Push(*d)));
    }
    if gate.pull {
        actions.extend(Direction::ALL.iter().map(|d| Action::Pull(*d)));
    }
    if gate.rifts {
        actions.extend(rift_targets(state).into_iter().map(Action::tunnel));
        actions.push(Action::ApplyRift(None));
    }
    actions
}

/// Canonical visited-set key
///
/// Player cell, then every object in id order with its cell on the current
/// slice, then remaining rift charges. Pushable and pullable objects add
/// their whole track, since a push made on a later slice is invisible from
/// an earlier one.
pub fn state_signature(state: &InteractionState) -> String {
    let player = state.player_position();
    let mut signature = format!("{},{},{}", player.x, player.y, player.t);

    for object in state.cube.objects() {
        let _ = write!(signature, "|{}", object.id);
        if object.is_pushable() || object.is_pullable() {
            for cell in object.track() {
                match cell {
                    Some(p) => {
                        let _ = write!(signature, ";{},{}", p.x, p.y);
                    }
                    None => signature.push_str(";-"),
                }
            }
        } else {
            match object.position_at(state.current_time) {
                Some(p) => {
                    let _ = write!(signature, "@{},{}", p.x, p.y);
                }
                None => signature.push_str("@-"),
            }
        }
    }

    if let Some(charges) = state.resources.rift_charges {
        let _ = write!(signature, "|c{}", charges);
    }
    signature
}
