//! Token farm: a staking ledger and reward-distribution engine.
//!
//! Stakers deposit an LP asset and accrue a reward asset proportional to
//! the number of blocks their stake stays active:
//! `reward = elapsed_blocks × staking_balance × reward_rate / RATE_SCALE`
//!
//! This crate handles:
//! - The per-account registry and the set of active stakers
//! - Settlement of accrued rewards at a checkpoint block
//! - Deposit, withdraw-all and reward claims through external asset ledgers
//! - Owner-triggered bulk settlement across all active stakers

pub mod account;
pub mod accrual;
pub mod auth;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod event;
pub mod registry;

pub use account::UserAccount;
pub use auth::{Authorizer, RoleList, SingleOwner};
pub use distribution::Distribution;
pub use engine::{ConservationReport, StakingEngine};
pub use error::FarmError;
pub use event::{EventBus, FarmEvent};
pub use registry::Registry;
