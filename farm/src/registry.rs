//! Account registry and the active-staker set.

use crate::account::UserAccount;
use crate::error::FarmError;
use farm_store::{StakerStore, SCHEMA_VERSION_KEY};
use farm_types::AccountId;
use std::collections::{BTreeSet, HashMap};

/// On-disk layout version of bincode-encoded [`UserAccount`] records.
pub const SCHEMA_VERSION: u32 = 1;

/// Every account the farm has ever seen, plus the set of accounts with a
/// non-zero stake.
///
/// The staker set is what bulk distribution walks, so its cost is bounded by
/// active participants rather than all-time accounts. It is kept in a
/// `BTreeSet` so distribution order is deterministic.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    accounts: HashMap<AccountId, UserAccount>,
    stakers: BTreeSet<AccountId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from stored records. The staker set is derived by
    /// filtering `is_staking`.
    pub fn from_accounts(accounts: impl IntoIterator<Item = (AccountId, UserAccount)>) -> Self {
        let mut registry = Self::new();
        for (id, account) in accounts {
            registry.commit(id, account);
        }
        registry
    }

    pub fn get(&self, id: &AccountId) -> Option<&UserAccount> {
        self.accounts.get(id)
    }

    /// A working copy of the account, or a zeroed one if it has never been
    /// committed. Nothing is created until [`commit`](Self::commit).
    pub fn snapshot(&self, id: &AccountId) -> UserAccount {
        self.accounts.get(id).cloned().unwrap_or_default()
    }

    /// Write a working copy back, keeping `is_staking` and the staker set in
    /// step with the balance.
    pub fn commit(&mut self, id: AccountId, mut account: UserAccount) {
        account.sync_staking_flag();
        if account.is_staking {
            self.stakers.insert(id.clone());
        } else {
            self.stakers.remove(&id);
        }
        self.accounts.insert(id, account);
    }

    pub fn is_staker(&self, id: &AccountId) -> bool {
        self.stakers.contains(id)
    }

    /// Active stakers in ascending id order.
    pub fn stakers(&self) -> impl Iterator<Item = &AccountId> {
        self.stakers.iter()
    }

    pub fn staker_count(&self) -> usize {
        self.stakers.len()
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &UserAccount)> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of every staking balance.
    pub fn total_staked(&self) -> Result<u128, FarmError> {
        self.stakers
            .iter()
            .filter_map(|id| self.accounts.get(id))
            .try_fold(0u128, |acc, a| acc.checked_add(a.staking_balance))
            .ok_or(FarmError::Overflow)
    }
}

impl Registry {
    /// Persist every account to a staker store in one batch.
    pub fn save_to_store(&self, store: &dyn StakerStore) -> Result<(), FarmError> {
        let ids: Vec<AccountId> = self.accounts.keys().cloned().collect();
        self.save_accounts(store, &ids)
    }

    /// Persist the given accounts in one batch. Ids that were never
    /// committed are skipped.
    pub fn save_accounts(&self, store: &dyn StakerStore, ids: &[AccountId]) -> Result<(), FarmError> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(account) = self.accounts.get(id) {
                let bytes = bincode::serialize(account).map_err(|e| FarmError::Store(e.to_string()))?;
                records.push((id.clone(), bytes));
            }
        }
        if records.is_empty() {
            return Ok(());
        }
        store.put_meta(SCHEMA_VERSION_KEY, &SCHEMA_VERSION.to_be_bytes())?;
        store.put_accounts(&records)?;
        Ok(())
    }

    /// Restore a registry from a staker store.
    pub fn load_from_store(store: &dyn StakerStore) -> Result<Self, FarmError> {
        if let Some(bytes) = store.get_meta(SCHEMA_VERSION_KEY)? {
            let raw: [u8; 4] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| FarmError::Store("malformed schema version".into()))?;
            let version = u32::from_be_bytes(raw);
            if version != SCHEMA_VERSION {
                return Err(FarmError::Store(format!(
                    "unsupported schema version {version}, expected {SCHEMA_VERSION}"
                )));
            }
        }

        let mut accounts = Vec::new();
        for (id, bytes) in store.iter_accounts()? {
            let account: UserAccount =
                bincode::deserialize(&bytes).map_err(|e| FarmError::Store(e.to_string()))?;
            accounts.push((id, account));
        }
        Ok(Self::from_accounts(accounts))
    }
}
