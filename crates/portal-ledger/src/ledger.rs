use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy_primitives::{Address, U256};

use crate::{
    error::LedgerError,
    state::{LedgerSnapshot, LedgerState, Limits},
    types::{AccountId, AccountKey, Asset, AssetClass, AssetId, Mutation, RetrieveOperation},
    AssetLedger,
};

/// In-memory [`AssetLedger`]. Every call holds one lock for its whole
/// duration, so callers on different threads observe whole operations only.
#[derive(Default)]
pub struct Ledger {
    state: Mutex<LedgerState>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            state: Mutex::new(LedgerState::with_limits(limits)),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.lock().snapshot()
    }

    // Single operations write only after validation. A section that
    // panicked midway is rolled back before the state is handed out again.
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            let mut state = poisoned.into_inner();
            state.abandon_section();
            state
        })
    }
}

impl AssetLedger for Ledger {
    fn retrieve_asset(
        &self,
        token: Address,
        token_id: Option<U256>,
        class: AssetClass,
        op: RetrieveOperation,
    ) -> Result<AssetId, LedgerError> {
        self.lock().retrieve_asset(token, token_id, class, op)
    }

    fn retrieve_account(
        &self,
        key: &AccountKey,
        op: RetrieveOperation,
    ) -> Result<AccountId, LedgerError> {
        self.lock().retrieve_account(key, op)
    }

    fn deposit(&self, asset: AssetId, account: AccountId, amount: U256) -> Result<(), LedgerError> {
        self.lock().deposit(asset, account, amount)
    }

    fn withdraw(&self, asset: AssetId, account: AccountId, amount: U256) -> Result<(), LedgerError> {
        self.lock().withdraw(asset, account, amount)
    }

    fn transfer(
        &self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.lock().transfer(asset, from, to, amount)
    }

    fn balance(&self, asset: AssetId, account: AccountId) -> Result<U256, LedgerError> {
        self.lock().balance(asset, account)
    }

    fn total_supply(&self, asset: AssetId) -> Result<U256, LedgerError> {
        self.lock().total_supply(asset)
    }

    fn asset(&self, asset: AssetId) -> Result<Asset, LedgerError> {
        self.lock().asset(asset)
    }

    fn apply(&self, mutations: &[Mutation]) -> Result<(), LedgerError> {
        self.lock().apply(mutations)
    }

    fn atomically<T, E>(&self, f: impl FnOnce(&mut LedgerState) -> Result<T, E>) -> Result<T, E> {
        self.lock().atomically(f)
    }

    fn reset(&self) {
        self.lock().reset()
    }
}
