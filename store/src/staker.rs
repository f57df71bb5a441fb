use crate::StoreError;
use farm_types::AccountId;

/// Meta key holding the on-disk record layout version.
pub const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Store trait for persisting the staker registry to durable storage.
///
/// Uses opaque `Vec<u8>` records so the store doesn't depend on the engine
/// crate; the engine serializes/deserializes its own account type. There is
/// no delete: account records live forever so reward history survives a
/// full withdrawal.
pub trait StakerStore: Send + Sync {
    fn get_account(&self, id: &AccountId) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_account(&self, id: &AccountId, record: &[u8]) -> Result<(), StoreError>;
    fn iter_accounts(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError>;
    fn account_count(&self) -> Result<u64, StoreError>;

    /// Write several records as one unit. Backends with transactions must
    /// make the batch all-or-nothing.
    fn put_accounts(&self, records: &[(AccountId, Vec<u8>)]) -> Result<(), StoreError> {
        for (id, record) in records {
            self.put_account(id, record)?;
        }
        Ok(())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}
