//! Farm-specific errors.

use farm_ledger::LedgerError;
use farm_types::{AccountId, BlockHeight};
use thiserror::Error;

/// Errors surfaced to callers of the staking engine.
///
/// None of these are retried internally; resubmitting is the caller's call.
#[derive(Debug, Error)]
pub enum FarmError {
    #[error("amount must be non-zero")]
    InvalidAmount,

    #[error("account {0} has no active stake")]
    NotStaking(AccountId),

    #[error("account {0} has no rewards to claim")]
    NoRewards(AccountId),

    #[error("no active stakers to distribute rewards to")]
    NoStakers,

    #[error("asset transfer failed: {0}")]
    TransferFailed(#[from] LedgerError),

    #[error("{0} is not authorized for this operation")]
    Unauthorized(AccountId),

    #[error("block {now} precedes checkpoint {checkpoint}")]
    StaleBlock {
        checkpoint: BlockHeight,
        now: BlockHeight,
    },

    #[error("arithmetic overflow in farm accounting")]
    Overflow,

    #[error("store error: {0}")]
    Store(String),
}

impl From<farm_store::StoreError> for FarmError {
    fn from(e: farm_store::StoreError) -> Self {
        FarmError::Store(e.to_string())
    }
}
