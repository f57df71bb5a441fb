//! Events emitted after successful farm operations.

use farm_types::{AccountId, BlockHeight};

/// Farm-level events that observers can subscribe to via the [`EventBus`].
///
/// Emitted only after the registry has committed the operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FarmEvent {
    /// LP units were staked.
    Deposited {
        account: AccountId,
        amount: u128,
        block: BlockHeight,
    },
    /// An account's whole stake was returned.
    Withdrawn {
        account: AccountId,
        amount: u128,
        block: BlockHeight,
    },
    /// Rewards were settled into `pending_rewards` for one account.
    RewardsSettled {
        account: AccountId,
        amount: u128,
        block: BlockHeight,
    },
    /// Pending rewards were paid out.
    RewardsClaimed {
        account: AccountId,
        amount: u128,
        block: BlockHeight,
    },
    /// An owner settled every active staker.
    RewardsDistributed {
        caller: AccountId,
        stakers: usize,
        total_settled: u128,
        block: BlockHeight,
    },
}

/// Synchronous fan-out event bus for farm events.
///
/// Listeners are invoked inline on the emitting thread; keep handlers fast to
/// avoid stalling the single writer.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&FarmEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&FarmEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &FarmEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
