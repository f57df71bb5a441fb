//! Nullable store: thread-safe in-memory storage for testing.

use farm_store::{StakerStore, StoreError};
use farm_types::AccountId;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory staker store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStakerStore {
    accounts: Mutex<BTreeMap<AccountId, Vec<u8>>>,
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
    failing: AtomicBool,
}

impl NullStakerStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(BTreeMap::new()),
            meta: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every write fail until reset.
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store is failing writes".into()));
        }
        Ok(())
    }
}

impl Default for NullStakerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StakerStore for NullStakerStore {
    fn get_account(&self, id: &AccountId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.accounts.lock().unwrap().get(id).cloned())
    }

    fn put_account(&self, id: &AccountId, record: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.accounts.lock().unwrap().insert(id.clone(), record.to_vec());
        Ok(())
    }

    fn iter_accounts(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.lock().unwrap().len() as u64)
    }

    fn put_accounts(&self, records: &[(AccountId, Vec<u8>)]) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut accounts = self.accounts.lock().unwrap();
        for (id, record) in records {
            accounts.insert(id.clone(), record.clone());
        }
        Ok(())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().unwrap().get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.meta.lock().unwrap().insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
