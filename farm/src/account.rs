//! Per-account stake and reward state.

use farm_types::BlockHeight;
use serde::{Deserialize, Serialize};

/// Stake and reward state for a single account.
///
/// Created lazily on first successful deposit with every field zeroed, and
/// never deleted: after a full withdrawal the record keeps carrying
/// `pending_rewards` until they are claimed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// LP units currently staked.
    pub staking_balance: u128,

    /// `staking_balance > 0`, stored for O(1) membership checks.
    pub is_staking: bool,

    /// Block up to which rewards have been settled.
    pub checkpoint_block: BlockHeight,

    /// Settled rewards not yet transferred to the account.
    pub pending_rewards: u128,

    /// Rewards paid out over the account's lifetime.
    #[serde(default)]
    pub total_claimed: u128,
}

impl UserAccount {
    /// Re-derive `is_staking` from the balance.
    pub(crate) fn sync_staking_flag(&mut self) {
        self.is_staking = self.staking_balance > 0;
    }
}
