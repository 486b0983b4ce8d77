use std::collections::{BTreeMap, HashMap};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    error::LedgerError,
    types::{AccountId, AccountKey, Asset, AssetClass, AssetId, Mutation, RetrieveOperation},
};

/// Upper bounds on handle allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_assets: u64,
    pub max_accounts: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_assets: u64::MAX,
            max_accounts: u64::MAX,
        }
    }
}

#[derive(Clone, Debug)]
struct AssetEntry {
    asset: Asset,
    supply: U256,
    /// Zero balances are not stored.
    balances: BTreeMap<AccountId, U256>,
}

impl AssetEntry {
    fn balance_of(&self, account: AccountId) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }
}

/// Prior value of one cell written inside [`LedgerState::atomically`].
#[derive(Debug)]
enum Undo {
    Asset {
        key: (Address, Option<U256>),
        previous: Option<AssetId>,
    },
    Account {
        key: AccountKey,
        previous: Option<AccountId>,
    },
    Balance {
        index: usize,
        account: AccountId,
        previous: Option<U256>,
    },
    Supply {
        index: usize,
        previous: U256,
    },
}

/// Single-threaded ledger state. Every operation validates completely
/// before it writes, so a failed call leaves the state untouched.
/// [`LedgerState::atomically`] extends that to a sequence of calls.
#[derive(Default)]
pub struct LedgerState {
    limits: Limits,
    assets: Vec<AssetEntry>,
    asset_index: HashMap<(Address, Option<U256>), AssetId>,
    accounts: Vec<AccountKey>,
    account_index: HashMap<AccountKey, AccountId>,
    journal: Option<Vec<Undo>>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self::with_limits(self.limits);
    }

    pub fn retrieve_asset(
        &mut self,
        token: Address,
        token_id: Option<U256>,
        class: AssetClass,
        op: RetrieveOperation,
    ) -> Result<AssetId, LedgerError> {
        let asset = Asset {
            token,
            token_id,
            class,
        };
        let existing = self.asset_index.get(&(token, token_id)).copied();

        match (op, existing) {
            (RetrieveOperation::Find | RetrieveOperation::FindOrCreate, Some(id)) => Ok(id),
            (RetrieveOperation::Find, None) => Err(LedgerError::asset_not_found(asset)),
            (RetrieveOperation::Create, _) | (RetrieveOperation::FindOrCreate, None) => {
                let id = AssetId(next_handle(self.assets.len(), self.limits.max_assets, "asset")?);
                self.assets.push(AssetEntry {
                    asset,
                    supply: U256::ZERO,
                    balances: BTreeMap::new(),
                });
                let key = (token, token_id);
                let previous = self.asset_index.insert(key, id);
                self.record(Undo::Asset { key, previous });
                Ok(id)
            }
        }
    }

    pub fn retrieve_account(
        &mut self,
        key: &AccountKey,
        op: RetrieveOperation,
    ) -> Result<AccountId, LedgerError> {
        let existing = self.account_index.get(key).copied();

        match (op, existing) {
            (RetrieveOperation::Find | RetrieveOperation::FindOrCreate, Some(id)) => Ok(id),
            (RetrieveOperation::Find, None) => Err(LedgerError::AccountNotFound {
                account: key.to_string(),
            }),
            (RetrieveOperation::Create, _) | (RetrieveOperation::FindOrCreate, None) => {
                let id = AccountId(next_handle(
                    self.accounts.len(),
                    self.limits.max_accounts,
                    "account",
                )?);
                self.accounts.push(*key);
                let previous = self.account_index.insert(*key, id);
                self.record(Undo::Account { key: *key, previous });
                Ok(id)
            }
        }
    }

    pub fn asset(&self, asset: AssetId) -> Result<Asset, LedgerError> {
        Ok(self.entry(asset)?.1.asset)
    }

    pub fn balance(&self, asset: AssetId, account: AccountId) -> Result<U256, LedgerError> {
        Ok(self.entry(asset)?.1.balance_of(account))
    }

    pub fn total_supply(&self, asset: AssetId) -> Result<U256, LedgerError> {
        Ok(self.entry(asset)?.1.supply)
    }

    pub fn deposit(
        &mut self,
        asset: AssetId,
        account: AccountId,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let (index, entry) = self.entry(asset)?;
        self.check_account(account)?;

        let supply = entry
            .supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { asset })?;
        let balance = entry
            .balance_of(account)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow { asset, account })?;

        self.write_supply(index, supply);
        self.write_balance(index, account, balance);
        Ok(())
    }

    pub fn withdraw(
        &mut self,
        asset: AssetId,
        account: AccountId,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let (index, entry) = self.entry(asset)?;
        self.check_account(account)?;

        let current = entry.balance_of(account);
        let balance = current
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                asset,
                account,
                balance: current,
                requested: amount,
            })?;
        // supply >= balance >= amount
        let supply = entry
            .supply
            .checked_sub(amount)
            .ok_or(LedgerError::SupplyOverflow { asset })?;

        self.write_supply(index, supply);
        self.write_balance(index, account, balance);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let (index, entry) = self.entry(asset)?;
        self.check_account(from)?;
        self.check_account(to)?;

        let current = entry.balance_of(from);
        let from_balance = current
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                asset,
                account: from,
                balance: current,
                requested: amount,
            })?;
        if from == to {
            return Ok(());
        }
        let to_balance = entry
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow { asset, account: to })?;

        self.write_balance(index, from, from_balance);
        self.write_balance(index, to, to_balance);
        Ok(())
    }

    /// Run `f` as one unit. When it returns an error every write it made
    /// is undone, handle allocation included. A section opened inside `f`
    /// joins the enclosing one.
    pub fn atomically<T, E>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        if self.journal.is_some() {
            return f(self);
        }

        self.journal = Some(Vec::new());
        let result = f(self);
        let journal = self.journal.take().unwrap_or_default();

        if result.is_err() {
            self.rollback(journal);
        }
        result
    }

    /// Apply `mutations` in order. On the first failure every earlier
    /// mutation of the batch is undone and the error is returned.
    pub fn apply(&mut self, mutations: &[Mutation]) -> Result<(), LedgerError> {
        self.atomically(|state| {
            mutations
                .iter()
                .try_for_each(|mutation| state.apply_one(mutation))
        })
    }

    fn apply_one(&mut self, mutation: &Mutation) -> Result<(), LedgerError> {
        match *mutation {
            Mutation::Deposit {
                asset,
                account,
                amount,
            } => self.deposit(asset, account, amount),
            Mutation::Withdraw {
                asset,
                account,
                amount,
            } => self.withdraw(asset, account, amount),
            Mutation::Transfer {
                asset,
                from,
                to,
                amount,
            } => self.transfer(asset, from, to, amount),
        }
    }

    /// Undo a section left open by a panic inside [`Self::atomically`].
    pub(crate) fn abandon_section(&mut self) {
        if let Some(journal) = self.journal.take() {
            self.rollback(journal);
        }
    }

    fn rollback(&mut self, journal: Vec<Undo>) {
        for undo in journal.into_iter().rev() {
            match undo {
                Undo::Asset { key, previous } => {
                    self.assets.pop();
                    match previous {
                        Some(id) => self.asset_index.insert(key, id),
                        None => self.asset_index.remove(&key),
                    };
                }
                Undo::Account { key, previous } => {
                    self.accounts.pop();
                    match previous {
                        Some(id) => self.account_index.insert(key, id),
                        None => self.account_index.remove(&key),
                    };
                }
                Undo::Balance {
                    index,
                    account,
                    previous,
                } => {
                    if let Some(entry) = self.assets.get_mut(index) {
                        match previous {
                            Some(value) => entry.balances.insert(account, value),
                            None => entry.balances.remove(&account),
                        };
                    }
                }
                Undo::Supply { index, previous } => {
                    if let Some(entry) = self.assets.get_mut(index) {
                        entry.supply = previous;
                    }
                }
            }
        }
    }

    fn entry(&self, asset: AssetId) -> Result<(usize, &AssetEntry), LedgerError> {
        asset
            .0
            .checked_sub(1)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| self.assets.get(index).map(|entry| (index, entry)))
            .ok_or_else(|| LedgerError::asset_not_found(asset))
    }

    fn check_account(&self, account: AccountId) -> Result<(), LedgerError> {
        let allocated = u64::try_from(self.accounts.len()).unwrap_or(u64::MAX);
        if account.0 == 0 || account.0 > allocated {
            return Err(LedgerError::InvalidAccount { account });
        }
        Ok(())
    }

    fn record(&mut self, undo: Undo) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(undo);
        }
    }

    fn write_supply(&mut self, index: usize, value: U256) {
        if let Some(entry) = self.assets.get_mut(index) {
            let previous = std::mem::replace(&mut entry.supply, value);
            self.record(Undo::Supply { index, previous });
        }
    }

    fn write_balance(&mut self, index: usize, account: AccountId, value: U256) {
        if let Some(entry) = self.assets.get_mut(index) {
            let previous = if value.is_zero() {
                entry.balances.remove(&account)
            } else {
                entry.balances.insert(account, value)
            };
            self.record(Undo::Balance {
                index,
                account,
                previous,
            });
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let assets: Vec<AssetSnapshot> = self
            .assets
            .iter()
            .zip(1u64..)
            .map(|(entry, id)| AssetSnapshot {
                id: AssetId(id),
                asset: entry.asset,
                supply: entry.supply,
                balances: entry.balances.iter().map(|(k, v)| (*k, *v)).collect(),
            })
            .collect();
        let accounts: Vec<(AccountId, AccountKey)> = self
            .accounts
            .iter()
            .zip(1u64..)
            .map(|(key, id)| (AccountId(id), *key))
            .collect();

        LedgerSnapshot { assets, accounts }
    }
}

fn next_handle(allocated: usize, max: u64, what: &str) -> Result<u64, LedgerError> {
    u64::try_from(allocated)
        .ok()
        .filter(|count| *count < max)
        .and_then(|count| count.checked_add(1))
        .ok_or_else(|| LedgerError::InsertionError {
            reason: format!("{what} handles exhausted after {allocated}"),
        })
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetSnapshot {
    pub id: AssetId,
    pub asset: Asset,
    pub supply: U256,
    pub balances: Vec<(AccountId, U256)>,
}

/// Point-in-time copy of the whole ledger.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub assets: Vec<AssetSnapshot>,
    pub accounts: Vec<(AccountId, AccountKey)>,
}

impl LedgerSnapshot {
    /// Every supply equals the sum of its balances.
    pub fn is_consistent(&self) -> bool {
        self.assets.iter().all(|asset| {
            asset
                .balances
                .iter()
                .try_fold(U256::ZERO, |sum, (_, balance)| sum.checked_add(*balance))
                == Some(asset.supply)
        })
    }
}
