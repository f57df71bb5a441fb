//! Nullable clock: deterministic block heights for testing.

use farm_types::{BlockClock, BlockHeight};
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic block clock for testing.
///
/// Blocks are only mined when you tell it to. Thread-safe so it can be
/// shared with a service task.
pub struct NullClock {
    current: AtomicU64,
}

impl NullClock {
    pub fn new(initial_block: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_block),
        }
    }

    /// Get the current block.
    pub fn now(&self) -> BlockHeight {
        BlockHeight::new(self.current.load(Ordering::SeqCst))
    }

    /// Mine `blocks` empty blocks.
    pub fn advance(&self, blocks: u64) {
        self.current.fetch_add(blocks, Ordering::SeqCst);
    }

    /// Jump to a specific height.
    pub fn set(&self, block: u64) {
        self.current.store(block, Ordering::SeqCst);
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(1)
    }
}

impl BlockClock for NullClock {
    fn current_block(&self) -> BlockHeight {
        self.now()
    }
}
