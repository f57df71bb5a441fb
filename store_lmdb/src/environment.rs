//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::staker::LmdbStakerStore;
use crate::LmdbError;

/// Named databases opened in every environment.
const MAX_DBS: u32 = 2;

/// Default map size: 1 GiB. LMDB reserves address space, not disk.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    path: PathBuf,
    pub(crate) accounts_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment in the directory `path`.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process per directory;
        // callers must not open the same path twice concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let accounts_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("accounts"))?;
        let meta_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(Self {
            env: Arc::new(env),
            path: path.to_path_buf(),
            accounts_db,
            meta_db,
        })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A staker store sharing this environment.
    pub fn staker_store(&self) -> LmdbStakerStore {
        LmdbStakerStore::new(Arc::clone(&self.env), self.accounts_db, self.meta_db)
    }
}
