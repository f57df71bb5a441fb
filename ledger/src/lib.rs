//! Fungible asset ledger boundary.
//!
//! The farm holds no token balances itself. LP deposits, withdrawals and
//! reward payouts are delegated to an external ledger that speaks this
//! interface; one instance per asset.

pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use ledger::AssetLedger;
