//! The `AssetLedger` trait: an opaque fungible-balance store.

use crate::LedgerError;
use farm_types::AccountId;

/// A fungible asset ledger (LP asset or reward asset).
///
/// Every call is a single atomic sub-step: it either fully applies or
/// returns an error with no balance change. Methods take `&self`; concrete
/// ledgers provide their own interior synchronisation.
pub trait AssetLedger: Send + Sync {
    /// Human-readable asset name, for logs.
    fn name(&self) -> &str;

    fn balance_of(&self, account: &AccountId) -> Result<u128, LedgerError>;

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Result<u128, LedgerError>;

    /// Let `spender` move up to `amount` of `owner`'s balance.
    fn approve(&self, owner: &AccountId, spender: &AccountId, amount: u128)
        -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to`, authorised by `from` itself.
    fn transfer(&self, from: &AccountId, to: &AccountId, amount: u128) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    fn transfer_from(
        &self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;
}
