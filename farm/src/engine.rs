//! Core staking engine.

use crate::account::UserAccount;
use crate::accrual;
use crate::auth::Authorizer;
use crate::error::FarmError;
use crate::event::{EventBus, FarmEvent};
use crate::registry::Registry;
use farm_ledger::AssetLedger;
use farm_types::{AccountId, BlockHeight, FarmParams};
use std::sync::Arc;

/// Deposits, withdrawals and reward claims against the registry.
///
/// Every mutating operation follows the same shape: take a snapshot of the
/// caller's account, settle it at `now`, make the single asset-ledger call,
/// and only then commit the snapshot. If the ledger rejects the movement
/// nothing is committed, so a failed operation is unobservable.
pub struct StakingEngine {
    name: String,
    params: FarmParams,
    /// Account that holds staked LP units and the reward reserve.
    custody: AccountId,
    lp_asset: Arc<dyn AssetLedger>,
    reward_asset: Arc<dyn AssetLedger>,
    pub(crate) authorizer: Box<dyn Authorizer>,
    pub(crate) registry: Registry,
    pub(crate) events: EventBus,
}

impl StakingEngine {
    pub const DEFAULT_NAME: &'static str = "Simple Token Farm";

    pub fn new(
        params: FarmParams,
        custody: AccountId,
        lp_asset: Arc<dyn AssetLedger>,
        reward_asset: Arc<dyn AssetLedger>,
        authorizer: Box<dyn Authorizer>,
    ) -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            params,
            custody,
            lp_asset,
            reward_asset,
            authorizer,
            registry: Registry::new(),
            events: EventBus::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Start from a previously persisted registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&FarmEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    /// Stake `amount` LP units for `caller`.
    ///
    /// The caller must have approved the custody account as spender on the
    /// LP ledger. Returns the caller's account after the deposit.
    pub fn deposit(
        &mut self,
        caller: &AccountId,
        amount: u128,
        now: BlockHeight,
    ) -> Result<UserAccount, FarmError> {
        if amount == 0 {
            return Err(FarmError::InvalidAmount);
        }
        let mut account = self.registry.snapshot(caller);
        let settled = accrual::accrue(&mut account, now, self.params.reward_rate)?;
        let new_balance = account
            .staking_balance
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;

        self.lp_asset
            .transfer_from(&self.custody, caller, &self.custody, amount)?;

        account.staking_balance = new_balance;
        account.sync_staking_flag();
        self.registry.commit(caller.clone(), account.clone());

        tracing::debug!(account = %caller, amount, balance = new_balance, block = %now, "deposit committed");
        self.emit_settled(caller, settled, now);
        self.events.emit(&FarmEvent::Deposited {
            account: caller.clone(),
            amount,
            block: now,
        });
        Ok(account)
    }

    /// Return the caller's whole stake. Pending rewards are kept for a
    /// later claim. Returns the withdrawn amount.
    pub fn withdraw(&mut self, caller: &AccountId, now: BlockHeight) -> Result<u128, FarmError> {
        let mut account = self.registry.snapshot(caller);
        if account.staking_balance == 0 {
            return Err(FarmError::NotStaking(caller.clone()));
        }
        let settled = accrual::accrue(&mut account, now, self.params.reward_rate)?;
        let amount = account.staking_balance;

        self.lp_asset.transfer(&self.custody, caller, amount)?;

        account.staking_balance = 0;
        self.registry.commit(caller.clone(), account);

        tracing::debug!(account = %caller, amount, block = %now, "withdrawal committed");
        self.emit_settled(caller, settled, now);
        self.events.emit(&FarmEvent::Withdrawn {
            account: caller.clone(),
            amount,
            block: now,
        });
        Ok(amount)
    }

    /// Pay out the caller's pending rewards from the reward reserve.
    /// Returns the claimed amount.
    pub fn claim_rewards(&mut self, caller: &AccountId, now: BlockHeight) -> Result<u128, FarmError> {
        let mut account = self.registry.snapshot(caller);
        let settled = accrual::accrue(&mut account, now, self.params.reward_rate)?;
        let amount = account.pending_rewards;
        if amount == 0 {
            return Err(FarmError::NoRewards(caller.clone()));
        }
        let total_claimed = account
            .total_claimed
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;

        self.reward_asset.transfer(&self.custody, caller, amount)?;

        account.pending_rewards = 0;
        account.total_claimed = total_claimed;
        self.registry.commit(caller.clone(), account);

        tracing::debug!(account = %caller, amount, block = %now, "rewards claimed");
        self.emit_settled(caller, settled, now);
        self.events.emit(&FarmEvent::RewardsClaimed {
            account: caller.clone(),
            amount,
            block: now,
        });
        Ok(amount)
    }

    pub(crate) fn emit_settled(&self, account: &AccountId, amount: u128, block: BlockHeight) {
        if amount > 0 {
            self.events.emit(&FarmEvent::RewardsSettled {
                account: account.clone(),
                amount,
                block,
            });
        }
    }
}

/// Staked units recorded by the registry next to LP units actually held by
/// the custody account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConservationReport {
    pub staked: u128,
    pub held: u128,
}

impl ConservationReport {
    pub fn is_balanced(&self) -> bool {
        self.staked == self.held
    }
}

impl StakingEngine {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &FarmParams {
        &self.params
    }

    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn account(&self, id: &AccountId) -> Option<&UserAccount> {
        self.registry.get(id)
    }

    pub fn stakers(&self) -> Vec<AccountId> {
        self.registry.stakers().cloned().collect()
    }

    pub fn total_staked(&self) -> Result<u128, FarmError> {
        self.registry.total_staked()
    }

    /// Rewards `id` would be owed if settled at `now`.
    pub fn pending_rewards(&self, id: &AccountId, now: BlockHeight) -> Result<u128, FarmError> {
        accrual::pending_at(&self.registry.snapshot(id), now, self.params.reward_rate)
    }

    /// Reward-asset balance available for claims.
    pub fn reward_reserve(&self) -> Result<u128, FarmError> {
        Ok(self.reward_asset.balance_of(&self.custody)?)
    }

    /// Compare the registry's total stake with the LP balance in custody.
    pub fn conservation(&self) -> Result<ConservationReport, FarmError> {
        Ok(ConservationReport {
            staked: self.registry.total_staked()?,
            held: self.lp_asset.balance_of(&self.custody)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SingleOwner;
    use farm_ledger::LedgerError;
    use farm_nullables::{NullAssetLedger, NullClock};
    use farm_types::DEFAULT_REWARD_RATE;
    use std::sync::Mutex;

    const EMISSION: u128 = 1_000_000;

    struct Fixture {
        engine: StakingEngine,
        lp: Arc<NullAssetLedger>,
        reward: Arc<NullAssetLedger>,
        clock: NullClock,
        owner: AccountId,
        user: AccountId,
    }

    fn farm_account() -> AccountId {
        AccountId::new("token_farm")
    }

    /// Reward reserve funded with the whole emission, 100 LP units for the user.
    fn deploy_token_farm() -> Fixture {
        let owner = AccountId::new("owner");
        let user = AccountId::new("other_account");
        let lp = Arc::new(NullAssetLedger::new("LPToken"));
        let reward = Arc::new(NullAssetLedger::new("DApp Token"));
        lp.mint(&owner, EMISSION);
        reward.mint(&farm_account(), EMISSION);
        lp.transfer(&owner, &user, 100).unwrap();

        let engine = StakingEngine::new(
            FarmParams::default(),
            farm_account(),
            lp.clone(),
            reward.clone(),
            Box::new(SingleOwner(owner.clone())),
        );
        Fixture {
            engine,
            lp,
            reward,
            clock: NullClock::new(1),
            owner,
            user,
        }
    }

    fn approve_and_deposit(f: &mut Fixture, amount: u128) -> UserAccount {
        f.lp.approve(&f.user, &farm_account(), amount).unwrap();
        let user = f.user.clone();
        f.engine.deposit(&user, amount, f.clock.now()).unwrap()
    }

    #[test]
    fn farm_has_default_name() {
        let f = deploy_token_farm();
        assert_eq!(f.engine.name(), "Simple Token Farm");
        assert_eq!(f.engine.with_name("Other").name(), "Other");
    }

    #[test]
    fn deposit_moves_lp_into_custody() {
        let mut f = deploy_token_farm();
        let account = approve_and_deposit(&mut f, 100);

        assert_eq!(account.staking_balance, 100);
        assert!(account.is_staking);
        assert_eq!(f.lp.balance_of(&f.user).unwrap(), 0);
        assert_eq!(f.lp.balance_of(&farm_account()).unwrap(), 100);
        assert_eq!(f.engine.stakers(), vec![f.user.clone()]);
        assert!(f.engine.conservation().unwrap().is_balanced());
    }

    #[test]
    fn deposit_returns_the_committed_account() {
        let mut f = deploy_token_farm();
        let returned = approve_and_deposit(&mut f, 60);
        assert!(returned.is_staking);
        assert_eq!(f.engine.account(&f.user).unwrap(), &returned);

        f.clock.advance(10);
        let returned = approve_and_deposit(&mut f, 40);
        assert_eq!(f.engine.account(&f.user).unwrap(), &returned);
        assert_eq!(returned.staking_balance, 100);
    }

    #[test]
    fn zero_deposit_is_invalid() {
        let mut f = deploy_token_farm();
        let user = f.user.clone();
        assert!(matches!(
            f.engine.deposit(&user, 0, f.clock.now()),
            Err(FarmError::InvalidAmount)
        ));
        assert!(f.engine.account(&user).is_none());
    }

    #[test]
    fn deposit_without_approval_fails_and_creates_nothing() {
        let mut f = deploy_token_farm();
        let user = f.user.clone();
        let err = f.engine.deposit(&user, 100, f.clock.now()).unwrap_err();
        assert!(matches!(
            err,
            FarmError::TransferFailed(LedgerError::InsufficientAllowance { .. })
        ));
        assert!(f.engine.account(&user).is_none());
        assert!(f.engine.stakers().is_empty());
        assert_eq!(f.lp.balance_of(&user).unwrap(), 100);
    }

    #[test]
    fn second_deposit_settles_at_old_balance_first() {
        let mut f = deploy_token_farm();
        f.lp.transfer(&f.owner, &f.user, 100).unwrap();
        approve_and_deposit(&mut f, 100);
        f.clock.advance(40);
        let account = approve_and_deposit(&mut f, 100);

        // 40 blocks at 100 units, not at 200.
        assert_eq!(account.pending_rewards, 40);
        assert_eq!(account.staking_balance, 200);
        assert_eq!(account.checkpoint_block, f.clock.now());
    }

    #[test]
    fn failed_second_deposit_keeps_old_checkpoint() {
        let mut f = deploy_token_farm();
        approve_and_deposit(&mut f, 100);
        let before = f.engine.account(&f.user).unwrap().clone();
        f.clock.advance(40);

        let user = f.user.clone();
        assert!(f.engine.deposit(&user, 1, f.clock.now()).is_err());
        assert_eq!(f.engine.account(&user).unwrap(), &before);
    }

    #[test]
    fn withdraw_without_stake_is_not_staking() {
        let mut f = deploy_token_farm();
        let user = f.user.clone();
        assert!(matches!(
            f.engine.withdraw(&user, f.clock.now()),
            Err(FarmError::NotStaking(_))
        ));
    }

    #[test]
    fn withdraw_returns_everything_and_keeps_rewards() {
        let mut f = deploy_token_farm();
        approve_and_deposit(&mut f, 100);
        f.clock.advance(41);

        let user = f.user.clone();
        let withdrawn = f.engine.withdraw(&user, f.clock.now()).unwrap();
        assert_eq!(withdrawn, 100);

        let account = f.engine.account(&user).unwrap();
        assert_eq!(account.staking_balance, 0);
        assert!(!account.is_staking);
        assert!(account.pending_rewards >= 41);
        assert_eq!(f.lp.balance_of(&user).unwrap(), 100);
        assert!(f.engine.stakers().is_empty());
        assert!(f.engine.conservation().unwrap().is_balanced());
    }

    #[test]
    fn failed_withdraw_leaves_stake_in_place() {
        let mut f = deploy_token_farm();
        approve_and_deposit(&mut f, 100);
        let before = f.engine.account(&f.user).unwrap().clone();
        f.clock.advance(10);
        f.lp.fail_transfers(true);

        let user = f.user.clone();
        assert!(matches!(
            f.engine.withdraw(&user, f.clock.now()),
            Err(FarmError::TransferFailed(_))
        ));
        assert_eq!(f.engine.account(&user).unwrap(), &before);
        assert!(f.engine.registry().is_staker(&user));
        assert!(f.engine.conservation().unwrap().is_balanced());
    }

    #[test]
    fn claim_pays_pending_and_zeroes_it() {
        let mut f = deploy_token_farm();
        approve_and_deposit(&mut f, 100);
        f.clock.advance(40);
        let user = f.user.clone();
        f.engine.withdraw(&user, f.clock.now()).unwrap();
        let pending = f.engine.account(&user).unwrap().pending_rewards;

        let claimed = f.engine.claim_rewards(&user, f.clock.now()).unwrap();
        assert_eq!(claimed, pending);
        assert_eq!(f.reward.balance_of(&user).unwrap(), pending);
        let account = f.engine.account(&user).unwrap();
        assert_eq!(account.pending_rewards, 0);
        assert_eq!(account.total_claimed, pending);
        assert_eq!(f.engine.reward_reserve().unwrap(), EMISSION - pending);
    }

    #[test]
    fn claim_settles_open_interval_while_staking() {
        let mut f = deploy_token_farm();
        approve_and_deposit(&mut f, 100);
        f.clock.advance(200);
        let user = f.user.clone();
        assert_eq!(f.engine.claim_rewards(&user, f.clock.now()).unwrap(), 200);
        assert!(f.engine.account(&user).unwrap().is_staking);
    }

    #[test]
    fn claim_with_nothing_pending_is_no_rewards() {
        let mut f = deploy_token_farm();
        let user = f.user.clone();
        assert!(matches!(
            f.engine.claim_rewards(&user, f.clock.now()),
            Err(FarmError::NoRewards(_))
        ));
        assert!(f.engine.account(&user).is_none());
    }

    #[test]
    fn claim_beyond_reserve_keeps_pending() {
        let mut f = deploy_token_farm();
        approve_and_deposit(&mut f, 100);
        f.clock.advance(40);
        f.reward.transfer(&farm_account(), &f.owner, EMISSION).unwrap();

        let user = f.user.clone();
        let err = f.engine.claim_rewards(&user, f.clock.now()).unwrap_err();
        assert!(matches!(
            err,
            FarmError::TransferFailed(LedgerError::InsufficientBalance { .. })
        ));
        // Not settled either: the operation as a whole did not happen.
        assert_eq!(f.engine.account(&user).unwrap().pending_rewards, 0);
        assert_eq!(f.engine.pending_rewards(&user, f.clock.now()).unwrap(), 40);
    }

    #[test]
    fn stale_block_is_rejected() {
        let mut f = deploy_token_farm();
        f.clock.set(100);
        approve_and_deposit(&mut f, 100);
        let user = f.user.clone();
        assert!(matches!(
            f.engine.withdraw(&user, BlockHeight::new(99)),
            Err(FarmError::StaleBlock { .. })
        ));
    }

    #[test]
    fn deposit_then_withdraw_then_claim_matches_rate() {
        let mut f = deploy_token_farm();
        approve_and_deposit(&mut f, 100);
        f.clock.advance(40);
        let user = f.user.clone();
        f.engine.withdraw(&user, f.clock.now()).unwrap();
        let expected = 100 * 40 * DEFAULT_REWARD_RATE / farm_types::RATE_SCALE;
        assert_eq!(f.engine.account(&user).unwrap().pending_rewards, expected);
        f.clock.advance(5);
        assert_eq!(f.engine.claim_rewards(&user, f.clock.now()).unwrap(), expected);
    }

    #[test]
    fn events_follow_committed_operations() {
        let mut f = deploy_token_farm();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        f.engine.subscribe(Box::new(move |event| {
            sink.lock().unwrap().push(event.clone());
        }));

        let user = f.user.clone();
        assert!(f.engine.deposit(&user, 100, f.clock.now()).is_err());
        approve_and_deposit(&mut f, 100);
        f.clock.advance(40);
        f.engine.withdraw(&user, f.clock.now()).unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], FarmEvent::Deposited { amount: 100, .. }));
        assert!(matches!(events[1], FarmEvent::RewardsSettled { amount: 40, .. }));
        assert!(matches!(events[2], FarmEvent::Withdrawn { amount: 100, .. }));
    }
}
