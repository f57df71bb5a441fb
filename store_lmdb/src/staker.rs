//! LMDB implementation of StakerStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use farm_store::{StakerStore, StoreError};
use farm_types::AccountId;

use crate::LmdbError;

pub struct LmdbStakerStore {
    env: Arc<Env>,
    accounts_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbStakerStore {
    pub fn new(env: Arc<Env>, accounts_db: Database<Bytes, Bytes>, meta_db: Database<Bytes, Bytes>) -> Self {
        Self { env, accounts_db, meta_db }
    }
}

fn decode_key(key: &[u8]) -> Result<AccountId, LmdbError> {
    AccountId::try_from(key).map_err(|e| LmdbError::Serialization(e.to_string()))
}

impl StakerStore for LmdbStakerStore {
    fn get_account(&self, id: &AccountId) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let record = self
            .accounts_db
            .get(&rtxn, id.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(record.map(|bytes| bytes.to_vec()))
    }

    fn put_account(&self, id: &AccountId, record: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.accounts_db
            .put(&mut wtxn, id.as_bytes(), record)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_accounts(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        let iter = self.accounts_db.iter(&rtxn).map_err(LmdbError::from)?;
        for item in iter {
            let (key, val) = item.map_err(LmdbError::from)?;
            results.push((decode_key(key)?, val.to_vec()));
        }
        Ok(results)
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.accounts_db.len(&rtxn).map_err(LmdbError::from)?)
    }

    /// All records land in one write transaction. If any put fails the
    /// transaction is dropped and LMDB aborts it.
    fn put_accounts(&self, records: &[(AccountId, Vec<u8>)]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for (id, record) in records {
            self.accounts_db
                .put(&mut wtxn, id.as_bytes(), record)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(records = records.len(), "staker batch committed");
        Ok(())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let value = self.meta_db.get(&rtxn, key).map_err(LmdbError::from)?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .put(&mut wtxn, key, value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
