//! The transition function
//!
//! `execute` applies one action to a state. Every check runs before the
//! first write, so a failed action leaves the state exactly as it was.
//! Successful actions advance the turn and set the current time to the
//! player's new slice. `execute` never consults detection; `play` adds it as
//! a loss condition for ordinary gameplay.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Direction, ObjectId, Position2D, Position3D};
use crate::interaction::state::{InteractionState, Phase};
use crate::spacetime::archetype::ComponentSet;
use crate::spacetime::time_cube::{CubeError, Relocation};
use crate::spacetime::world_line::WorldLineError;

/// Explicit tunnel choice for `ApplyRift`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RiftInstruction {
    pub target: Position3D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Move(Direction),
    Wait,
    Push(Direction),
    Pull(Direction),
    /// None jumps `rules.rift.default_delta` slices back in place
    ApplyRift(Option<RiftInstruction>),
}

impl Action {
    pub fn tunnel(target: Position3D) -> Self {
        Action::ApplyRift(Some(RiftInstruction { target }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Moved,
    Waited,
    /// Number of objects shifted
    Pushed(usize),
    Pulled,
    /// Charges consumed (0 when untracked)
    Rifted(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub effect: Effect,
    pub position: Position3D,
    pub won: bool,
    /// Set only by `play`
    pub detected: bool,
}

impl ActionOutcome {
    pub fn is_push_pull(&self) -> bool {
        matches!(self.effect, Effect::Pushed(_) | Effect::Pulled)
    }

    pub fn is_rift(&self) -> bool {
        matches!(self.effect, Effect::Rifted(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Game is not active")]
    GameNotActive,

    #[error("Target {0} is out of bounds")]
    OutOfBounds(Position3D),

    #[error("Blocked by object {object} at {at}")]
    BlockedByObject { object: ObjectId, at: Position3D },

    #[error(transparent)]
    Paradox(#[from] WorldLineError),

    #[error("Nothing to push towards {0:?}")]
    NothingToPush(Direction),

    #[error("Push chain of {length} exceeds the limit of {max}")]
    PushChainTooLong { length: usize, max: usize },

    #[error("Push blocked at {0}")]
    PushBlocked(Position3D),

    #[error("Pulling is disabled")]
    PullDisabled,

    #[error("Nothing to pull from behind when stepping {0:?}")]
    NothingToPull(Direction),

    #[error("No tunnel to {0} from the current cell")]
    NoTunnel(Position3D),

    #[error("Rift needs {needed} charges, {available} left")]
    InsufficientRiftCharges { needed: u32, available: u32 },

    #[error("Cube update failed: {0}")]
    Cube(#[from] CubeError),
}

/// Apply one action, mutating `state` only on success
pub fn execute(state: &mut InteractionState, action: Action) -> Result<ActionOutcome, ActionError> {
    if state.phase != Phase::Playing {
        return Err(ActionError::GameNotActive);
    }

    match action {
        Action::Move(dir) => move_player(state, dir, action),
        Action::Wait => wait(state, action),
        Action::Push(dir) => push(state, dir, action),
        Action::Pull(dir) => pull(state, dir, action),
        Action::ApplyRift(instruction) => apply_rift(state, instruction, action),
    }
}

/// `execute`, then a detection check on the resulting state
///
/// A detected player loses even when the action reached an exit.
pub fn play(state: &mut InteractionState, action: Action) -> Result<ActionOutcome, ActionError> {
    let mut outcome = execute(state, action)?;
    if state.detect().detected() {
        state.phase = Phase::Detected;
        outcome.won = false;
        outcome.detected = true;
    }
    Ok(outcome)
}

/// Tunnel targets usable from the player's cell, sorted
///
/// Includes forward targets of rifts standing on the player's cell and the
/// source cells of bidirectional rifts whose target is the player's cell.
pub fn rift_targets(state: &InteractionState) -> Vec<Position3D> {
    let here = state.player_position();
    let mut targets: Vec<Position3D> = state
        .cube
        .objects_at(here)
        .iter()
        .filter_map(|object| object.rift().map(|rift| rift.target))
        .collect();

    for object in state.cube.objects() {
        if let Some(rift) = object.rift() {
            if rift.bidirectional && rift.target == here {
                targets.push(object.origin);
            }
        }
    }

    targets.sort();
    targets.dedup();
    targets
}

fn ensure_open(
    state: &InteractionState,
    target: Position3D,
    ignore: &[ObjectId],
) -> Result<(), ActionError> {
    if !state.cube.in_bounds(target) {
        return Err(ActionError::OutOfBounds(target));
    }
    if let Some(blocker) = state.cube.blocking_object_at(target, ignore) {
        return Err(ActionError::BlockedByObject {
            object: blocker.id.clone(),
            at: target,
        });
    }
    ensure_off_world_line(state, target)
}

/// Rift landings ignore blockers; only time bounds and the world line apply
fn ensure_rift_landing(state: &InteractionState, target: Position3D) -> Result<(), ActionError> {
    if !state.cube.in_bounds(target) {
        return Err(ActionError::OutOfBounds(target));
    }
    ensure_off_world_line(state, target)
}

fn ensure_off_world_line(state: &InteractionState, target: Position3D) -> Result<(), ActionError> {
    if let Some(entry) = state.world_line.entries().iter().find(|e| e.position == target) {
        return Err(WorldLineError::SelfIntersection {
            position: target,
            turn: entry.turn,
        }
        .into());
    }
    Ok(())
}

fn commit(
    state: &mut InteractionState,
    target: Position3D,
    effect: Effect,
    action: Action,
) -> Result<ActionOutcome, ActionError> {
    state.world_line.append(state.turn + 1, target)?;
    state.turn += 1;
    state.current_time = target.t;
    state.history.push(action);

    let won = state.cube.has_exit(target);
    if won {
        state.phase = Phase::Won;
    }
    Ok(ActionOutcome {
        effect,
        position: target,
        won,
        detected: false,
    })
}

fn move_player(
    state: &mut InteractionState,
    dir: Direction,
    action: Action,
) -> Result<ActionOutcome, ActionError> {
    let target = state.player_position().step(dir);
    if !state.cube.in_bounds(target) {
        return Err(ActionError::OutOfBounds(target));
    }
    if state.rules.push_on_move {
        let pushable_ahead = state
            .cube
            .blocking_object_at(target, &[])
            .is_some_and(|o| o.is_pushable());
        if pushable_ahead {
            return push(state, dir, action);
        }
    }
    ensure_open(state, target, &[])?;
    commit(state, target, Effect::Moved, action)
}

fn wait(state: &mut InteractionState, action: Action) -> Result<ActionOutcome, ActionError> {
    let target = state.player_position().tick();
    ensure_open(state, target, &[])?;
    commit(state, target, Effect::Waited, action)
}

fn push(
    state: &mut InteractionState,
    dir: Direction,
    action: Action,
) -> Result<ActionOutcome, ActionError> {
    let here = state.player_position();
    let target = here.step(dir);
    if !state.cube.in_bounds(target) {
        return Err(ActionError::OutOfBounds(target));
    }

    // Walk the chain on the current slice
    let mut chain: Vec<(ObjectId, Position2D)> = Vec::new();
    let mut cell = here.shifted(dir);
    loop {
        let pushable = state
            .cube
            .objects_at(cell)
            .into_iter()
            .find(|o| o.is_pushable());
        match pushable {
            Some(object) => chain.push((object.id.clone(), cell.spatial())),
            None => break,
        }
        cell = cell.shifted(dir);
    }
    if chain.is_empty() {
        return Err(ActionError::NothingToPush(dir));
    }
    let max = state.rules.max_push_chain;
    if chain.len() > max {
        return Err(ActionError::PushChainTooLong {
            length: chain.len(),
            max,
        });
    }

    // The cell past the chain must be free on the next slice
    let members: Vec<ObjectId> = chain.iter().map(|(id, _)| id.clone()).collect();
    let beyond = cell.tick();
    if !state.cube.in_bounds(beyond) || state.cube.blocking_object_at(beyond, &members).is_some() {
        return Err(ActionError::PushBlocked(beyond));
    }
    ensure_open(state, target, &members)?;

    let relocations: Vec<Relocation> = chain
        .iter()
        .map(|(id, from)| {
            let (dx, dy) = dir.delta();
            Relocation::new(id.clone(), Position2D::new(from.x + dx, from.y + dy))
        })
        .collect();
    state.cube.apply_relocations_from_time(target.t, &relocations)?;
    commit(state, target, Effect::Pushed(chain.len()), action)
}

fn pull(
    state: &mut InteractionState,
    dir: Direction,
    action: Action,
) -> Result<ActionOutcome, ActionError> {
    if !state.rules.allow_pull {
        return Err(ActionError::PullDisabled);
    }
    let here = state.player_position();
    let target = here.step(dir);
    ensure_open(state, target, &[])?;

    let behind = here.shifted(dir.opposite());
    let pulled = state
        .cube
        .objects_at(behind)
        .into_iter()
        .find(|o| o.is_pullable())
        .map(|o| o.id.clone())
        .ok_or(ActionError::NothingToPull(dir))?;

    state
        .cube
        .apply_relocations_from_time(target.t, &[Relocation::new(pulled, here.spatial())])?;
    commit(state, target, Effect::Pulled, action)
}

fn apply_rift(
    state: &mut InteractionState,
    instruction: Option<RiftInstruction>,
    action: Action,
) -> Result<ActionOutcome, ActionError> {
    let here = state.player_position();
    let target = match instruction {
        None => Position3D::new(here.x, here.y, here.t - state.rules.rift.default_delta),
        Some(RiftInstruction { target }) => {
            if !rift_targets(state).contains(&target) {
                return Err(ActionError::NoTunnel(target));
            }
            target
        }
    };
    ensure_rift_landing(state, target)?;

    let cost = state.rules.rift.cost;
    let remaining = match state.resources.rift_charges {
        Some(available) if available < cost => {
            return Err(ActionError::InsufficientRiftCharges {
                needed: cost,
                available,
            });
        }
        Some(available) => Some(available - cost),
        None => None,
    };

    let outcome = commit(
        state,
        target,
        Effect::Rifted(if remaining.is_some() { cost } else { 0 }),
        action,
    )?;
    state.resources.rift_charges = remaining;
    Ok(outcome)
}
