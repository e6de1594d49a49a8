//! Rule defaults with documented constants
//!
//! Every level carries a `RuleDefaults` block. Authored levels override
//! individual fields; generated levels take them from the generation profile.

use serde::{Deserialize, Serialize};

/// Rift tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiftRules {
    /// How many slices an untargeted rift jumps backwards
    ///
    /// At 2, a player standing at t=5 lands on t=3. A delta of 0 can never
    /// succeed because the player's own current cell is already occupied.
    pub default_delta: i32,

    /// Charges consumed per rift use (only when `charges` is tracked)
    pub cost: u32,

    /// Starting rift charges
    ///
    /// `None` disables resource tracking entirely; rifts are then free.
    pub charges: Option<u32>,
}

impl Default for RiftRules {
    fn default() -> Self {
        Self {
            default_delta: 2,
            cost: 1,
            charges: None,
        }
    }
}

/// Rule block consumed by the transition function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDefaults {
    // === RIFTS ===
    pub rift: RiftRules,

    // === PUSH / PULL ===
    /// Longest run of consecutive pushables a single push may shift
    ///
    /// Longer chains fail outright rather than pushing a prefix.
    pub max_push_chain: usize,

    /// Whether `Pull` is a legal action at all
    pub allow_pull: bool,

    /// Whether a `Move` into a pushable chain resolves as a push
    ///
    /// The solver switches this off when push/pull is excluded from a
    /// search, so that exclusion also covers implicit pushes.
    pub push_on_move: bool,
}

impl Default for RuleDefaults {
    fn default() -> Self {
        Self {
            rift: RiftRules::default(),
            max_push_chain: 3,
            allow_pull: true,
            push_on_move: true,
        }
    }
}

impl RuleDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate rule values for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.max_push_chain == 0 {
            return Err("max_push_chain must be at least 1".into());
        }

        if self.rift.default_delta < 0 {
            return Err(format!(
                "rift.default_delta ({}) must not be negative",
                self.rift.default_delta
            ));
        }

        if self.rift.charges.is_some() && self.rift.cost == 0 {
            return Err("rift.cost must be positive when rift charges are tracked".into());
        }

        Ok(())
    }
}
