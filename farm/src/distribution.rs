//! Owner-triggered bulk settlement across all active stakers.
//!
//! Settlement only: pending rewards are credited on the ledger, no asset
//! moves. Stakers still claim individually.

use crate::accrual;
use crate::engine::StakingEngine;
use crate::error::FarmError;
use crate::event::FarmEvent;
use farm_types::{AccountId, BlockHeight};

/// Outcome of a bulk settlement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Distribution {
    pub block: BlockHeight,
    /// Number of active stakers settled.
    pub stakers: usize,
    /// Rewards credited across all stakers by this call.
    pub total_settled: u128,
}

impl StakingEngine {
    /// Settle every active staker at `now`.
    ///
    /// Shares the per-account checkpoint with individual settlement, so a
    /// second call in the same block, or a call right after a staker
    /// settled themselves, credits nothing extra. Either every staker is
    /// settled or none is.
    pub fn distribute_rewards_all(
        &mut self,
        caller: &AccountId,
        now: BlockHeight,
    ) -> Result<Distribution, FarmError> {
        if !self.authorizer.is_authorized(caller) {
            return Err(FarmError::Unauthorized(caller.clone()));
        }
        if self.registry.staker_count() == 0 {
            return Err(FarmError::NoStakers);
        }

        let rate = self.params().reward_rate;
        let mut settled = Vec::with_capacity(self.registry.staker_count());
        let mut total_settled: u128 = 0;
        for id in self.registry.stakers() {
            let mut account = self.registry.snapshot(id);
            let delta = accrual::accrue(&mut account, now, rate)?;
            total_settled = total_settled.checked_add(delta).ok_or(FarmError::Overflow)?;
            settled.push((id.clone(), account, delta));
        }

        let stakers = settled.len();
        for (id, account, delta) in settled {
            self.registry.commit(id.clone(), account);
            self.emit_settled(&id, delta, now);
        }

        tracing::info!(caller = %caller, stakers, total_settled, block = %now, "rewards distributed");
        self.events.emit(&FarmEvent::RewardsDistributed {
            caller: caller.clone(),
            stakers,
            total_settled,
            block: now,
        });
        Ok(Distribution {
            block: now,
            stakers,
            total_settled,
        })
    }
}
