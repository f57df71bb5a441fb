//! Farm configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use farm_engine::{Authorizer, RoleList, SingleOwner, StakingEngine};
use farm_ledger::AssetLedger;
use farm_types::{AccountId, FarmParams, DEFAULT_REWARD_RATE};

use crate::{LogFormat, ServiceError};

/// Configuration for a farm service.
///
/// Can be loaded from a TOML file via [`FarmConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). The asset ledgers and the block
/// clock are supplied by the host and are not part of the file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FarmConfig {
    /// Display name of the farm.
    #[serde(default = "default_name")]
    pub name: String,

    /// Account that holds staked LP units and the reward reserve.
    #[serde(default = "default_custody_account")]
    pub custody_account: String,

    /// Principals allowed to run bulk distribution.
    #[serde(default)]
    pub owners: Vec<String>,

    /// Reward units per staked unit per block, scaled by `RATE_SCALE`.
    ///
    /// TOML integers stop at `i64::MAX`, so larger rates are written as a
    /// decimal string, e.g. `reward_rate = "50000000000000000000"`.
    #[serde(default = "default_reward_rate", with = "decimal_u128")]
    pub reward_rate: u128,

    /// Directory of the LMDB environment. Without it the farm is in-memory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_lmdb_map_size")]
    pub lmdb_map_size: usize,

    /// Bound of the request queue in front of the single writer.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_name() -> String {
    StakingEngine::DEFAULT_NAME.to_string()
}

fn default_custody_account() -> String {
    "token_farm".to_string()
}

fn default_reward_rate() -> u128 {
    DEFAULT_REWARD_RATE
}

fn default_lmdb_map_size() -> usize {
    farm_store_lmdb::environment::DEFAULT_MAP_SIZE
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A `u128` written as a decimal string, read from either a string or an integer.
mod decimal_u128 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Int(v) => Ok(u128::from(v)),
            Repr::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| de::Error::custom(format!("invalid decimal {s:?}: {e}"))),
        }
    }
}

// ── Impl ───────────────────────────────────────────────────────────────

impl FarmConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ServiceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ServiceError> {
        toml::from_str(s).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ServiceError> {
        toml::to_string_pretty(self).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Check every field that the types alone cannot enforce.
    pub fn validate(&self) -> Result<(), ServiceError> {
        self.custody()?;
        self.params()?;
        self.authorizer()?;
        self.log_format()?;
        if self.queue_capacity == 0 {
            return Err(ServiceError::Config("queue_capacity must be non-zero".into()));
        }
        if self.data_dir.is_some() && self.lmdb_map_size == 0 {
            return Err(ServiceError::Config("lmdb_map_size must be non-zero".into()));
        }
        Ok(())
    }

    pub fn custody(&self) -> Result<AccountId, ServiceError> {
        self.custody_account
            .parse()
            .map_err(|e| ServiceError::Config(format!("custody_account: {e}")))
    }

    pub fn params(&self) -> Result<FarmParams, ServiceError> {
        FarmParams::new(self.reward_rate)
            .map_err(|e| ServiceError::Config(format!("reward_rate: {e}")))
    }

    pub fn log_format(&self) -> Result<LogFormat, ServiceError> {
        self.log_format.parse()
    }

    /// One owner yields a [`SingleOwner`], several a [`RoleList`].
    pub fn authorizer(&self) -> Result<Box<dyn Authorizer>, ServiceError> {
        let owners = self
            .owners
            .iter()
            .map(|o| o.parse::<AccountId>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ServiceError::Config(format!("owners: {e}")))?;
        match owners.len() {
            0 => Err(ServiceError::Config("at least one owner is required".into())),
            1 => Ok(Box::new(SingleOwner(owners[0].clone()))),
            _ => Ok(Box::new(RoleList::new(owners))),
        }
    }

    /// Build an engine over the host's asset ledgers.
    pub fn build_engine(
        &self,
        lp_asset: Arc<dyn AssetLedger>,
        reward_asset: Arc<dyn AssetLedger>,
    ) -> Result<StakingEngine, ServiceError> {
        self.validate()?;
        Ok(StakingEngine::new(
            self.params()?,
            self.custody()?,
            lp_asset,
            reward_asset,
            self.authorizer()?,
        )
        .with_name(self.name.clone()))
    }
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            custody_account: default_custody_account(),
            owners: Vec::new(),
            reward_rate: default_reward_rate(),
            data_dir: None,
            lmdb_map_size: default_lmdb_map_size(),
            queue_capacity: default_queue_capacity(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
