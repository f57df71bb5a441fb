//! Block-based reward accrual.
//!
//! `reward_delta = elapsed × staking_balance × reward_rate / RATE_SCALE`
//!
//! The product is formed in 256-bit precision and divided by the scale once,
//! so the only rounding is the final floor. Settlement must run before any
//! change to `staking_balance`: each interval is priced at the single
//! balance that was held throughout it.

use crate::account::UserAccount;
use crate::error::FarmError;
use farm_types::{BlockHeight, RATE_SCALE};
use primitive_types::U256;

/// Reward earned by `staking_balance` over `elapsed_blocks` at `reward_rate`.
///
/// Returns `None` only if the floored result does not fit in a `u128`.
pub fn reward_delta(staking_balance: u128, elapsed_blocks: u64, reward_rate: u128) -> Option<u128> {
    if staking_balance == 0 || elapsed_blocks == 0 || reward_rate == 0 {
        return Some(0);
    }
    let scaled = U256::from(elapsed_blocks)
        .checked_mul(U256::from(staking_balance))?
        .checked_mul(U256::from(reward_rate))?;
    let delta = scaled / U256::from(RATE_SCALE);
    if delta > U256::from(u128::MAX) {
        None
    } else {
        Some(delta.as_u128())
    }
}

/// Settle `account` up to `now`.
///
/// Credits the interval since the last checkpoint to `pending_rewards` and
/// moves the checkpoint to `now`. Same-block re-entry and idle accounts run
/// the same path and credit zero. Returns the credited amount.
pub fn accrue(account: &mut UserAccount, now: BlockHeight, reward_rate: u128) -> Result<u128, FarmError> {
    if now < account.checkpoint_block {
        return Err(FarmError::StaleBlock {
            checkpoint: account.checkpoint_block,
            now,
        });
    }
    let elapsed = account.checkpoint_block.elapsed_since(now);
    let delta = reward_delta(account.staking_balance, elapsed, reward_rate).ok_or(FarmError::Overflow)?;
    account.pending_rewards = account
        .pending_rewards
        .checked_add(delta)
        .ok_or(FarmError::Overflow)?;
    account.checkpoint_block = now;
    Ok(delta)
}

/// Rewards `account` would have pending if settled at `now`, without
/// mutating it.
pub fn pending_at(account: &UserAccount, now: BlockHeight, reward_rate: u128) -> Result<u128, FarmError> {
    let mut preview = account.clone();
    accrue(&mut preview, now, reward_rate)?;
    Ok(preview.pending_rewards)
}
