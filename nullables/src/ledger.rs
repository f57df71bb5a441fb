//! Nullable asset ledger for testing: an in-memory fungible token.

use farm_ledger::{AssetLedger, LedgerError};
use farm_types::AccountId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory fungible token with balances and allowances.
///
/// Behaves like a plain token contract: `transfer` needs balance,
/// `transfer_from` needs balance and allowance. Set [`fail_transfers`] to
/// make every outgoing movement fail, simulating a ledger outage.
///
/// [`fail_transfers`]: NullAssetLedger::fail_transfers
pub struct NullAssetLedger {
    name: String,
    balances: Mutex<HashMap<AccountId, u128>>,
    allowances: Mutex<HashMap<(AccountId, AccountId), u128>>,
    failing: AtomicBool,
    transfer_count: Mutex<usize>,
}

impl NullAssetLedger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            balances: Mutex::new(HashMap::new()),
            allowances: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
            transfer_count: Mutex::new(0),
        }
    }

    /// Create `amount` out of thin air for `to` (deploy-time emission).
    pub fn mint(&self, to: &AccountId, amount: u128) {
        *self.balances.lock().unwrap().entry(to.clone()).or_default() += amount;
    }

    /// Make all subsequent transfers fail until reset.
    pub fn fail_transfers(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful transfers (for assertions).
    pub fn transfer_count(&self) -> usize {
        *self.transfer_count.lock().unwrap()
    }

    /// Sum of every balance on the ledger.
    pub fn total_supply(&self) -> u128 {
        self.balances.lock().unwrap().values().sum()
    }

    fn move_balance(&self, from: &AccountId, to: &AccountId, amount: u128) -> Result<(), LedgerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable(format!("{} is failing transfers", self.name)));
        }
        let mut balances = self.balances.lock().unwrap();
        let available = balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let credited = balances
            .get(to)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        balances.insert(from.clone(), available - amount);
        balances.insert(to.clone(), credited);
        *self.transfer_count.lock().unwrap() += 1;
        Ok(())
    }
}

impl AssetLedger for NullAssetLedger {
    fn name(&self) -> &str {
        &self.name
    }

    fn balance_of(&self, account: &AccountId) -> Result<u128, LedgerError> {
        Ok(self.balances.lock().unwrap().get(account).copied().unwrap_or(0))
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Result<u128, LedgerError> {
        Ok(self
            .allowances
            .lock()
            .unwrap()
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0))
    }

    fn approve(&self, owner: &AccountId, spender: &AccountId, amount: u128) -> Result<(), LedgerError> {
        self.allowances
            .lock()
            .unwrap()
            .insert((owner.clone(), spender.clone()), amount);
        Ok(())
    }

    fn transfer(&self, from: &AccountId, to: &AccountId, amount: u128) -> Result<(), LedgerError> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let key = (from.clone(), spender.clone());
        let approved = self.allowances.lock().unwrap().get(&key).copied().unwrap_or(0);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }
        self.move_balance(from, to, amount)?;
        self.allowances.lock().unwrap().insert(key, approved - amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::new("alice")
    }

    fn farm() -> AccountId {
        AccountId::new("farm")
    }

    #[test]
    fn transfer_moves_balance() {
        let ledger = NullAssetLedger::new("LPToken");
        ledger.mint(&alice(), 100);
        ledger.transfer(&alice(), &farm(), 40).unwrap();
        assert_eq!(ledger.balance_of(&alice()).unwrap(), 60);
        assert_eq!(ledger.balance_of(&farm()).unwrap(), 40);
        assert_eq!(ledger.total_supply(), 100);
        assert_eq!(ledger.transfer_count(), 1);
    }

    #[test]
    fn transfer_without_balance_fails_cleanly() {
        let ledger = NullAssetLedger::new("LPToken");
        ledger.mint(&alice(), 10);
        let err = ledger.transfer(&alice(), &farm(), 11).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                needed: 11,
                available: 10
            }
        );
        assert_eq!(ledger.balance_of(&alice()).unwrap(), 10);
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let ledger = NullAssetLedger::new("LPToken");
        ledger.mint(&alice(), 100);
        ledger.approve(&alice(), &farm(), 100).unwrap();
        ledger.transfer_from(&farm(), &alice(), &farm(), 70).unwrap();
        assert_eq!(ledger.allowance(&alice(), &farm()).unwrap(), 30);
        assert_eq!(ledger.balance_of(&farm()).unwrap(), 70);
    }

    #[test]
    fn transfer_from_without_allowance_fails() {
        let ledger = NullAssetLedger::new("LPToken");
        ledger.mint(&alice(), 100);
        let err = ledger.transfer_from(&farm(), &alice(), &farm(), 1).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
    }

    #[test]
    fn failing_ledger_rejects_and_keeps_allowance() {
        let ledger = NullAssetLedger::new("LPToken");
        ledger.mint(&alice(), 100);
        ledger.approve(&alice(), &farm(), 100).unwrap();
        ledger.fail_transfers(true);
        assert!(ledger.transfer_from(&farm(), &alice(), &farm(), 50).is_err());
        assert_eq!(ledger.allowance(&alice(), &farm()).unwrap(), 100);
        assert_eq!(ledger.balance_of(&alice()).unwrap(), 100);
        ledger.fail_transfers(false);
        assert!(ledger.transfer_from(&farm(), &alice(), &farm(), 50).is_ok());
    }
}
