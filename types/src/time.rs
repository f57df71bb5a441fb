//! Block height, the logical clock of the farm.
//!
//! Reward accrual is measured in blocks, not seconds. The host environment
//! advances the height; the farm only ever consumes it through [`BlockClock`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A block number supplied by the host's ordering layer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockHeight(u64);

impl BlockHeight {
    /// The first block.
    pub const GENESIS: Self = Self(0);

    pub fn new(height: u64) -> Self {
        Self(height)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Blocks elapsed from this height up to `now` (0 if `now` is earlier).
    pub fn elapsed_since(&self, now: BlockHeight) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for BlockHeight {
    fn from(height: u64) -> Self {
        Self(height)
    }
}

/// Source of the current block height.
///
/// Implementations must be monotonic: successive calls never return a lower
/// height.
pub trait BlockClock: Send + Sync {
    fn current_block(&self) -> BlockHeight;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_counts_blocks_forward() {
        let start = BlockHeight::new(10);
        assert_eq!(start.elapsed_since(BlockHeight::new(50)), 40);
        assert_eq!(start.elapsed_since(start), 0);
    }

    #[test]
    fn elapsed_saturates_when_now_is_earlier() {
        assert_eq!(BlockHeight::new(50).elapsed_since(BlockHeight::new(10)), 0);
    }

    #[test]
    fn display_uses_hash_prefix() {
        assert_eq!(BlockHeight::new(42).to_string(), "#42");
    }
}
