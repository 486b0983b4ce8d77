//! Multi-asset balance ledger.
//!
//! Assets and accounts are addressed by small integer handles that are
//! allocated on first use. For every asset the ledger keeps a balance per
//! account and a total supply, and maintains two invariants across every
//! operation sequence:
//!
//! * balances are never negative;
//! * the supply of an asset equals the sum of its balances.
//!
//! Failed operations leave no trace. [`AssetLedger::apply`] extends that to
//! a whole batch of [`Mutation`]s and [`AssetLedger::atomically`] to any
//! sequence of calls, including the handles they allocate.

mod error;
mod ledger;
mod state;
mod types;

use alloy_primitives::{Address, U256};

pub use error::LedgerError;
pub use ledger::Ledger;
pub use state::{AssetSnapshot, LedgerSnapshot, LedgerState, Limits};
pub use types::{AccountId, AccountKey, Asset, AssetClass, AssetId, Mutation, RetrieveOperation};

/// Storage-agnostic ledger interface. [`Ledger`] keeps everything in memory;
/// a persistent backend implements the same contract.
pub trait AssetLedger {
    fn retrieve_asset(
        &self,
        token: Address,
        token_id: Option<U256>,
        class: AssetClass,
        op: RetrieveOperation,
    ) -> Result<AssetId, LedgerError>;

    fn retrieve_account(
        &self,
        key: &AccountKey,
        op: RetrieveOperation,
    ) -> Result<AccountId, LedgerError>;

    fn deposit(&self, asset: AssetId, account: AccountId, amount: U256) -> Result<(), LedgerError>;

    fn withdraw(&self, asset: AssetId, account: AccountId, amount: U256) -> Result<(), LedgerError>;

    /// Supply is unchanged. A transfer to self only checks funds.
    fn transfer(
        &self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: U256,
    ) -> Result<(), LedgerError>;

    /// Zero when the account holds nothing of `asset`.
    fn balance(&self, asset: AssetId, account: AccountId) -> Result<U256, LedgerError>;

    fn total_supply(&self, asset: AssetId) -> Result<U256, LedgerError>;

    fn asset(&self, asset: AssetId) -> Result<Asset, LedgerError>;

    /// All-or-nothing application of a batch. An empty batch changes nothing.
    fn apply(&self, mutations: &[Mutation]) -> Result<(), LedgerError>;

    /// Run `f` against the state as one unit; other callers observe all of
    /// it or none of it. On error every write `f` made is undone.
    fn atomically<T, E>(&self, f: impl FnOnce(&mut LedgerState) -> Result<T, E>) -> Result<T, E>;

    /// Back to the empty ledger; handles restart at 1.
    fn reset(&self);
}
