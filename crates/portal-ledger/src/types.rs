use std::fmt;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Handle of an asset, allocated in creation order starting at 1.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct AssetId(pub u64);

/// Handle of an account, allocated in creation order starting at 1.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Native,
    FungibleToken,
    NonFungibleOrSemiFungibleToken,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RetrieveOperation {
    /// Existing handle or `*NotFound`.
    Find,
    /// Always a fresh handle; the key now resolves to it.
    Create,
    FindOrCreate,
}

/// Wallet addresses and opaque keys live in separate key spaces.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum AccountKey {
    Wallet(Address),
    Opaque(B256),
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKey::Wallet(address) => write!(f, "wallet {address}"),
            AccountKey::Opaque(key) => write!(f, "key {key}"),
        }
    }
}

/// Identity attributes of an asset. Never change once created.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Asset {
    /// Zero for the native currency.
    pub token: Address,
    pub token_id: Option<U256>,
    pub class: AssetClass,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_id {
            Some(id) => write!(f, "token {} id {id}", self.token),
            None => write!(f, "token {}", self.token),
        }
    }
}

/// A balance change applied through [`crate::AssetLedger::apply`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    Deposit {
        asset: AssetId,
        account: AccountId,
        amount: U256,
    },
    Withdraw {
        asset: AssetId,
        account: AccountId,
        amount: U256,
    },
    Transfer {
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: U256,
    },
}
