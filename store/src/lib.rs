//! Abstract storage traits for the token farm.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The engine depends only on the traits.

pub mod error;
pub mod staker;

pub use error::StoreError;
pub use staker::{StakerStore, SCHEMA_VERSION_KEY};
