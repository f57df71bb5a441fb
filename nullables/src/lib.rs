//! Nullable infrastructure for deterministic testing.
//!
//! All external collaborators of the farm (block clock, asset ledgers,
//! storage) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (advance blocks, inject failures)
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod ledger;
pub mod store;

pub use clock::NullClock;
pub use ledger::NullAssetLedger;
pub use store::NullStakerStore;
