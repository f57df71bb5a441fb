//! LMDB storage backend for the token farm.
//!
//! Implements the storage traits from `farm-store` using the `heed` LMDB
//! bindings. Each logical store maps to one or more named databases within a
//! single environment.

pub mod environment;
pub mod error;
pub mod staker;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use staker::LmdbStakerStore;
