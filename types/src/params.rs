//! Reward parameters.
//!
//! The reward rate is a fixed-point number: reward units earned per staked
//! unit per block, multiplied by [`RATE_SCALE`]. Accrual multiplies first and
//! divides by the scale exactly once, so the only precision loss is the final
//! floor.

use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Fixed-point scale of [`FarmParams::reward_rate`] (1e18).
pub const RATE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Default rate: 0.01 reward unit per staked unit per block.
///
/// 100 staked units held for 41 blocks earn 41 reward units.
pub const DEFAULT_REWARD_RATE: u128 = RATE_SCALE / 100;

/// Parameters fixed at farm construction. Not mutable by users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmParams {
    /// Reward units per staked unit per block, scaled by [`RATE_SCALE`].
    pub reward_rate: u128,
}

impl FarmParams {
    pub fn new(reward_rate: u128) -> Result<Self, TypesError> {
        if reward_rate == 0 {
            return Err(TypesError::InvalidRate("reward rate must be non-zero".into()));
        }
        Ok(Self { reward_rate })
    }

    /// Build from a whole number of reward units per staked unit per block.
    pub fn from_whole_rate(units_per_block: u128) -> Result<Self, TypesError> {
        let scaled = units_per_block
            .checked_mul(RATE_SCALE)
            .ok_or_else(|| TypesError::InvalidRate(format!("{units_per_block} overflows the scale")))?;
        Self::new(scaled)
    }
}

impl Default for FarmParams {
    fn default() -> Self {
        Self {
            reward_rate: DEFAULT_REWARD_RATE,
        }
    }
}
