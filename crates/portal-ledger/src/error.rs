use alloy_primitives::U256;

use crate::types::{AccountId, AssetId};

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("asset not found: {asset}")]
    AssetNotFound { asset: String },
    #[error("account not found: {account}")]
    AccountNotFound { account: String },
    #[error("insufficient funds of {asset} in {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        asset: AssetId,
        account: AccountId,
        balance: U256,
        requested: U256,
    },
    #[error("supply of {asset} would overflow")]
    SupplyOverflow { asset: AssetId },
    #[error("balance of {asset} in {account} would overflow")]
    BalanceOverflow { asset: AssetId, account: AccountId },
    #[error("invalid account {account}")]
    InvalidAccount { account: AccountId },
    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },
    #[error("insertion failed: {reason}")]
    InsertionError { reason: String },
}

impl LedgerError {
    pub(crate) fn asset_not_found(asset: impl ToString) -> Self {
        Self::AssetNotFound {
            asset: asset.to_string(),
        }
    }
}
