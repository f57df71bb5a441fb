//! Single-writer request loop around the staking engine.
//!
//! Every farm operation becomes a [`Request`] on a bounded queue. One task
//! owns the [`StakingEngine`] and drains the queue in order, so operations
//! never interleave: each sees the committed result of the one before it.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use farm_engine::{Distribution, Registry, StakingEngine, UserAccount};
use farm_ledger::AssetLedger;
use farm_store::StakerStore;
use farm_store_lmdb::LmdbEnvironment;
use farm_types::{AccountId, BlockClock};

use crate::{FarmConfig, ServiceError};

type Reply<T> = oneshot::Sender<Result<T, ServiceError>>;

/// A farm operation queued for the writer task.
pub enum Request {
    Deposit {
        caller: AccountId,
        amount: u128,
        reply: Reply<UserAccount>,
    },
    Withdraw {
        caller: AccountId,
        reply: Reply<u128>,
    },
    ClaimRewards {
        caller: AccountId,
        reply: Reply<u128>,
    },
    DistributeRewardsAll {
        caller: AccountId,
        reply: Reply<Distribution>,
    },
    Account {
        id: AccountId,
        reply: oneshot::Sender<Option<UserAccount>>,
    },
    PendingRewards {
        id: AccountId,
        reply: Reply<u128>,
    },
    Stakers {
        reply: oneshot::Sender<Vec<AccountId>>,
    },
    TotalStaked {
        reply: Reply<u128>,
    },
    PersistLag {
        reply: oneshot::Sender<usize>,
    },
}

/// Owns the engine, the block clock and optional durable storage.
pub struct FarmService {
    engine: StakingEngine,
    clock: Arc<dyn BlockClock>,
    store: Option<Arc<dyn StakerStore>>,
    /// Committed accounts whose latest state has not reached the store.
    unpersisted: BTreeSet<AccountId>,
}

impl FarmService {
    pub fn new(engine: StakingEngine, clock: Arc<dyn BlockClock>) -> Self {
        Self {
            engine,
            clock,
            store: None,
            unpersisted: BTreeSet::new(),
        }
    }

    /// Write touched accounts through to `store` after every mutation.
    pub fn with_store(mut self, store: Arc<dyn StakerStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build a service from configuration. With a `data_dir` the LMDB
    /// environment is opened and the registry restored from it.
    pub fn open(
        config: &FarmConfig,
        lp_asset: Arc<dyn AssetLedger>,
        reward_asset: Arc<dyn AssetLedger>,
        clock: Arc<dyn BlockClock>,
    ) -> Result<Self, ServiceError> {
        let engine = config.build_engine(lp_asset, reward_asset)?;
        let service = Self::new(engine, clock);
        match &config.data_dir {
            Some(dir) => {
                let env = LmdbEnvironment::open(dir, config.lmdb_map_size)?;
                service.with_store(Arc::new(env.staker_store())).restore()
            }
            None => Ok(service),
        }
    }

    /// Replace the engine's registry with what the store holds.
    pub fn restore(mut self) -> Result<Self, ServiceError> {
        let Some(store) = self.store.as_ref() else {
            return Ok(self);
        };
        let registry = Registry::load_from_store(store.as_ref())?;
        tracing::info!(
            accounts = registry.len(),
            stakers = registry.staker_count(),
            "registry restored from store"
        );
        self.engine = self.engine.with_registry(registry);
        Ok(self)
    }

    pub fn engine(&self) -> &StakingEngine {
        &self.engine
    }

    /// Number of committed accounts the store has not caught up with.
    pub fn persist_lag(&self) -> usize {
        self.unpersisted.len()
    }

    /// Start the writer task. It runs until shutdown is signalled or every
    /// [`FarmHandle`] is dropped, then hands the service back.
    pub fn spawn(
        self,
        queue_capacity: usize,
        shutdown: broadcast::Receiver<()>,
    ) -> (FarmHandle, JoinHandle<FarmService>) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let task = tokio::spawn(self.run(rx, shutdown));
        (FarmHandle { tx }, task)
    }

    async fn run(
        mut self,
        mut requests: mpsc::Receiver<Request>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> FarmService {
        tracing::info!(farm = self.engine.name(), "farm service started");
        loop {
            let request = tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("farm service shutting down");
                    break;
                }
                request = requests.recv() => match request {
                    Some(request) => request,
                    None => {
                        tracing::info!("all farm handles dropped, stopping");
                        break;
                    }
                },
            };
            self.handle(request);
        }
        self
    }

    /// Process one request to completion. Each request reads the clock once.
    pub fn handle(&mut self, request: Request) {
        match request {
            Request::Deposit {
                caller,
                amount,
                reply,
            } => {
                let now = self.clock.current_block();
                let result = self.engine.deposit(&caller, amount, now).map_err(ServiceError::from);
                if result.is_ok() {
                    self.persist(vec![caller.clone()]);
                }
                log_outcome("deposit", &caller, &result);
                let _ = reply.send(result);
            }
            Request::Withdraw { caller, reply } => {
                let now = self.clock.current_block();
                let result = self.engine.withdraw(&caller, now).map_err(ServiceError::from);
                if result.is_ok() {
                    self.persist(vec![caller.clone()]);
                }
                log_outcome("withdraw", &caller, &result);
                let _ = reply.send(result);
            }
            Request::ClaimRewards { caller, reply } => {
                let now = self.clock.current_block();
                let result = self.engine.claim_rewards(&caller, now).map_err(ServiceError::from);
                if result.is_ok() {
                    self.persist(vec![caller.clone()]);
                }
                log_outcome("claim", &caller, &result);
                let _ = reply.send(result);
            }
            Request::DistributeRewardsAll { caller, reply } => {
                let now = self.clock.current_block();
                let result = self
                    .engine
                    .distribute_rewards_all(&caller, now)
                    .map_err(ServiceError::from);
                if result.is_ok() {
                    let stakers = self.engine.stakers();
                    self.persist(stakers);
                }
                log_outcome("distribution", &caller, &result);
                let _ = reply.send(result);
            }
            Request::Account { id, reply } => {
                let _ = reply.send(self.engine.account(&id).cloned());
            }
            Request::PendingRewards { id, reply } => {
                let now = self.clock.current_block();
                let _ = reply.send(self.engine.pending_rewards(&id, now).map_err(ServiceError::from));
            }
            Request::Stakers { reply } => {
                let _ = reply.send(self.engine.stakers());
            }
            Request::TotalStaked { reply } => {
                let _ = reply.send(self.engine.total_staked().map_err(ServiceError::from));
            }
            Request::PersistLag { reply } => {
                let _ = reply.send(self.persist_lag());
            }
        }
    }

    /// Write `ids` through to the store together with every account an
    /// earlier write failed to save. The engine has already committed, so a
    /// store failure never fails the request: the accounts stay queued in
    /// `unpersisted` and are retried on the next write.
    fn persist(&mut self, ids: Vec<AccountId>) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        self.unpersisted.extend(ids);
        let batch: Vec<AccountId> = self.unpersisted.iter().cloned().collect();
        match self.engine.registry().save_accounts(store.as_ref(), &batch) {
            Ok(()) => self.unpersisted.clear(),
            Err(e) => tracing::warn!(
                lagging = self.unpersisted.len(),
                error = %e,
                "failed to persist accounts, store is behind"
            ),
        }
    }
}

fn log_outcome<T>(op: &'static str, caller: &AccountId, result: &Result<T, ServiceError>) {
    match result {
        Ok(_) => tracing::info!(op, caller = %caller, "request accepted"),
        Err(ServiceError::Farm(e)) => tracing::info!(op, caller = %caller, error = %e, "request rejected"),
        Err(e) => tracing::warn!(op, caller = %caller, error = %e, "request failed"),
    }
}

/// Cloneable async client of a running [`FarmService`].
#[derive(Clone)]
pub struct FarmHandle {
    tx: mpsc::Sender<Request>,
}

impl FarmHandle {
    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| ServiceError::ChannelClosed)?;
        rx.await.map_err(|_| ServiceError::ChannelClosed)
    }

    pub async fn deposit(&self, caller: AccountId, amount: u128) -> Result<UserAccount, ServiceError> {
        self.call(|reply| Request::Deposit {
            caller,
            amount,
            reply,
        })
        .await?
    }

    pub async fn withdraw(&self, caller: AccountId) -> Result<u128, ServiceError> {
        self.call(|reply| Request::Withdraw { caller, reply }).await?
    }

    pub async fn claim_rewards(&self, caller: AccountId) -> Result<u128, ServiceError> {
        self.call(|reply| Request::ClaimRewards { caller, reply }).await?
    }

    pub async fn distribute_rewards_all(&self, caller: AccountId) -> Result<Distribution, ServiceError> {
        self.call(|reply| Request::DistributeRewardsAll { caller, reply })
            .await?
    }

    pub async fn account(&self, id: AccountId) -> Result<Option<UserAccount>, ServiceError> {
        self.call(|reply| Request::Account { id, reply }).await
    }

    /// Rewards `id` would be owed if settled at the current block.
    pub async fn pending_rewards(&self, id: AccountId) -> Result<u128, ServiceError> {
        self.call(|reply| Request::PendingRewards { id, reply }).await?
    }

    pub async fn stakers(&self) -> Result<Vec<AccountId>, ServiceError> {
        self.call(|reply| Request::Stakers { reply }).await
    }

    pub async fn total_staked(&self) -> Result<u128, ServiceError> {
        self.call(|reply| Request::TotalStaked { reply }).await?
    }

    /// Committed accounts not yet written to the store. Zero when the
    /// service runs without storage.
    pub async fn persist_lag(&self) -> Result<usize, ServiceError> {
        self.call(|reply| Request::PersistLag { reply }).await
    }
}
