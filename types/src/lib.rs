//! Fundamental types for the token farm.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account identities, the block-height logical clock, and reward parameters.

pub mod address;
pub mod error;
pub mod params;
pub mod time;

pub use address::AccountId;
pub use error::TypesError;
pub use params::{FarmParams, DEFAULT_REWARD_RATE, RATE_SCALE};
pub use time::{BlockClock, BlockHeight};
