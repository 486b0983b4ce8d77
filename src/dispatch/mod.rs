//! Executes decoded portal inputs against an [`AssetLedger`].
//!
//! Deposits create what they touch. Withdrawals and transfers only spend
//! from assets and wallets that already exist; a transfer receiver is an
//! opaque key created on first use. A withdrawal is redeemed on the base
//! layer through the voucher it emits. Each input runs as one atomic ledger
//! section, so a rejected input creates nothing.

use alloy_primitives::{Address, B256, U256};
use portal_codec::{
    decode_advance, decode_inspect,
    voucher::{
        erc1155_batch_voucher, erc1155_single_voucher, erc20_voucher, erc721_voucher,
        ether_voucher,
    },
    AccountParam, AdvanceInput, BalanceQuery, CodecError, InspectQuery, Output, Portals,
    SupplyQuery,
};
use portal_ledger::{
    AccountId, AccountKey, AssetClass, AssetId, AssetLedger, LedgerError, LedgerState, Mutation,
    RetrieveOperation::{self, Find, FindOrCreate},
};
use tracing::info;

use crate::{
    config::PortalConfig,
    rollup::{AdvanceRequest, InspectRequest, Metadata},
};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// ERC-721 tokens move one at a time.
const ONE: U256 = U256::from_limbs([1, 0, 0, 0]);

pub struct Dispatcher<'a, L: AssetLedger> {
    ledger: &'a L,
    portals: Portals,
    native: AssetId,
}

impl<'a, L: AssetLedger> Dispatcher<'a, L> {
    /// Registers the native asset if the ledger does not know it yet.
    pub fn new(ledger: &'a L, portals: Portals) -> Result<Self, DispatchError> {
        let native =
            ledger.retrieve_asset(Address::ZERO, None, AssetClass::Native, FindOrCreate)?;
        Ok(Self {
            ledger,
            portals,
            native,
        })
    }

    pub fn from_config(ledger: &'a L, config: &PortalConfig) -> Result<Self, DispatchError> {
        Self::new(ledger, config.portals)
    }

    pub fn native_asset(&self) -> AssetId {
        self.native
    }

    pub fn advance(&self, request: &AdvanceRequest) -> Result<Vec<Output>, DispatchError> {
        let metadata = &request.metadata;
        let input = decode_advance(&self.portals, &metadata.msg_sender, &request.payload)?;
        self.execute(metadata, input)
    }

    /// Apply an already decoded input. Any error rejects the whole input and
    /// leaves the ledger as it was, including accounts and assets the input
    /// would have created.
    pub fn execute(
        &self,
        metadata: &Metadata,
        input: AdvanceInput,
    ) -> Result<Vec<Output>, DispatchError> {
        let name = input.name();
        let outputs = self
            .ledger
            .atomically(|state| self.apply_input(state, metadata, input))?;

        info!(
            input = name,
            index = metadata.index,
            sender = %metadata.msg_sender,
            vouchers = outputs.len(),
            "input applied"
        );
        Ok(outputs)
    }

    fn apply_input(
        &self,
        state: &mut LedgerState,
        metadata: &Metadata,
        input: AdvanceInput,
    ) -> Result<Vec<Output>, DispatchError> {
        let sender = metadata.msg_sender;
        let app = metadata.app_contract;

        let outputs = match input {
            AdvanceInput::EtherDeposit(deposit) => {
                let account = wallet(state, deposit.sender, FindOrCreate)?;
                state.deposit(self.native, account, deposit.amount)?;
                Vec::new()
            }
            AdvanceInput::Erc20Deposit(deposit) => {
                let asset = fungible(state, deposit.token, FindOrCreate)?;
                let account = wallet(state, deposit.sender, FindOrCreate)?;
                state.deposit(asset, account, deposit.amount)?;
                Vec::new()
            }
            AdvanceInput::Erc721Deposit(deposit) => {
                let asset = identified(state, deposit.token, deposit.token_id, FindOrCreate)?;
                let account = wallet(state, deposit.sender, FindOrCreate)?;
                state.deposit(asset, account, ONE)?;
                Vec::new()
            }
            AdvanceInput::Erc1155SingleDeposit(deposit) => {
                let asset = identified(state, deposit.token, deposit.token_id, FindOrCreate)?;
                let account = wallet(state, deposit.sender, FindOrCreate)?;
                state.deposit(asset, account, deposit.amount)?;
                Vec::new()
            }
            AdvanceInput::Erc1155BatchDeposit(deposit) => {
                let account = wallet(state, deposit.sender, FindOrCreate)?;
                let mutations = batch(
                    state,
                    deposit.token,
                    &deposit.token_ids,
                    &deposit.amounts,
                    FindOrCreate,
                    |asset, amount| Mutation::Deposit {
                        asset,
                        account,
                        amount,
                    },
                )?;
                state.apply(&mutations)?;
                Vec::new()
            }

            AdvanceInput::EtherWithdrawal(withdrawal) => {
                let account = wallet(state, sender, Find)?;
                state.withdraw(self.native, account, withdrawal.amount)?;
                vec![ether_voucher(sender, withdrawal.amount).into()]
            }
            AdvanceInput::Erc20Withdrawal(withdrawal) => {
                let asset = fungible(state, withdrawal.token, Find)?;
                let account = wallet(state, sender, Find)?;
                state.withdraw(asset, account, withdrawal.amount)?;
                vec![erc20_voucher(withdrawal.token, sender, withdrawal.amount).into()]
            }
            AdvanceInput::Erc721Withdrawal(withdrawal) => {
                let asset = identified(state, withdrawal.token, withdrawal.token_id, Find)?;
                let account = wallet(state, sender, Find)?;
                state.withdraw(asset, account, ONE)?;
                vec![erc721_voucher(withdrawal.token, app, sender, withdrawal.token_id).into()]
            }
            AdvanceInput::Erc1155SingleWithdrawal(withdrawal) => {
                let asset = identified(state, withdrawal.token, withdrawal.token_id, Find)?;
                let account = wallet(state, sender, Find)?;
                state.withdraw(asset, account, withdrawal.amount)?;
                vec![erc1155_single_voucher(
                    withdrawal.token,
                    app,
                    sender,
                    withdrawal.token_id,
                    withdrawal.amount,
                )
                .into()]
            }
            AdvanceInput::Erc1155BatchWithdrawal(withdrawal) => {
                let account = wallet(state, sender, Find)?;
                let mutations = batch(
                    state,
                    withdrawal.token,
                    &withdrawal.token_ids,
                    &withdrawal.amounts,
                    Find,
                    |asset, amount| Mutation::Withdraw {
                        asset,
                        account,
                        amount,
                    },
                )?;
                state.apply(&mutations)?;
                vec![erc1155_batch_voucher(
                    withdrawal.token,
                    app,
                    sender,
                    &withdrawal.token_ids,
                    &withdrawal.amounts,
                )
                .into()]
            }

            AdvanceInput::EtherTransfer(transfer) => {
                let from = wallet(state, sender, Find)?;
                let to = opaque(state, transfer.receiver)?;
                state.transfer(self.native, from, to, transfer.amount)?;
                Vec::new()
            }
            AdvanceInput::Erc20Transfer(transfer) => {
                let asset = fungible(state, transfer.token, Find)?;
                let from = wallet(state, sender, Find)?;
                let to = opaque(state, transfer.receiver)?;
                state.transfer(asset, from, to, transfer.amount)?;
                Vec::new()
            }
            AdvanceInput::Erc721Transfer(transfer) => {
                let asset = identified(state, transfer.token, transfer.token_id, Find)?;
                let from = wallet(state, sender, Find)?;
                let to = opaque(state, transfer.receiver)?;
                state.transfer(asset, from, to, ONE)?;
                Vec::new()
            }
            AdvanceInput::Erc1155SingleTransfer(transfer) => {
                let asset = identified(state, transfer.token, transfer.token_id, Find)?;
                let from = wallet(state, sender, Find)?;
                let to = opaque(state, transfer.receiver)?;
                state.transfer(asset, from, to, transfer.amount)?;
                Vec::new()
            }
            AdvanceInput::Erc1155BatchTransfer(transfer) => {
                let from = wallet(state, sender, Find)?;
                let to = opaque(state, transfer.receiver)?;
                let mutations = batch(
                    state,
                    transfer.token,
                    &transfer.token_ids,
                    &transfer.amounts,
                    Find,
                    |asset, amount| Mutation::Transfer {
                        asset,
                        from,
                        to,
                        amount,
                    },
                )?;
                state.apply(&mutations)?;
                Vec::new()
            }
        };
        Ok(outputs)
    }

    /// Answer a query with a single report holding a 32-byte big-endian word.
    pub fn inspect(&self, request: &InspectRequest) -> Result<Vec<Output>, DispatchError> {
        let query = decode_inspect(&request.payload)?;
        let value = self.query(&query)?;
        Ok(vec![Output::Report {
            payload: value.to_be_bytes::<32>().to_vec(),
        }])
    }

    /// Accounts and assets the ledger has never seen read as zero.
    pub fn query(&self, query: &InspectQuery) -> Result<U256, DispatchError> {
        match query {
            InspectQuery::Balance(balance) => self.balance_of(balance),
            InspectQuery::Supply(supply) => self.supply_of(supply),
        }
    }

    fn balance_of(&self, query: &BalanceQuery) -> Result<U256, DispatchError> {
        let (account, asset) = match query {
            BalanceQuery::Bare => {
                return Err(CodecError::IncompatibleInput {
                    expected: "balance query with an account",
                    found: "bare balance query",
                }
                .into())
            }
            BalanceQuery::Account { account } => (account, Some(self.native)),
            BalanceQuery::AccountToken { account, token } => {
                (account, self.queried_asset(*token, None)?)
            }
            BalanceQuery::AccountTokenId {
                account,
                token,
                token_id,
                ..
            } => (account, self.queried_asset(*token, Some(*token_id))?),
        };

        let key = match account {
            AccountParam::Wallet(address) => AccountKey::Wallet(*address),
            AccountParam::Opaque(key) => AccountKey::Opaque(*key),
        };
        let Some(account) = absent_as_none(self.ledger.retrieve_account(&key, Find))? else {
            return Ok(U256::ZERO);
        };
        match asset {
            Some(asset) => Ok(self.ledger.balance(asset, account)?),
            None => Ok(U256::ZERO),
        }
    }

    fn supply_of(&self, query: &SupplyQuery) -> Result<U256, DispatchError> {
        let asset = match query {
            SupplyQuery::Native => Some(self.native),
            SupplyQuery::Token { token } => self.queried_asset(*token, None)?,
            SupplyQuery::TokenId {
                token, token_id, ..
            } => self.queried_asset(*token, Some(*token_id))?,
        };
        match asset {
            Some(asset) => Ok(self.ledger.total_supply(asset)?),
            None => Ok(U256::ZERO),
        }
    }

    /// The zero token address names the native asset whatever the id.
    fn queried_asset(
        &self,
        token: Address,
        token_id: Option<U256>,
    ) -> Result<Option<AssetId>, DispatchError> {
        if token == Address::ZERO {
            return Ok(Some(self.native));
        }
        let class = match token_id {
            Some(_) => AssetClass::NonFungibleOrSemiFungibleToken,
            None => AssetClass::FungibleToken,
        };
        Ok(absent_as_none(self.ledger.retrieve_asset(token, token_id, class, Find))?)
    }
}

fn fungible(
    state: &mut LedgerState,
    token: Address,
    op: RetrieveOperation,
) -> Result<AssetId, LedgerError> {
    state.retrieve_asset(token, None, AssetClass::FungibleToken, op)
}

fn identified(
    state: &mut LedgerState,
    token: Address,
    token_id: U256,
    op: RetrieveOperation,
) -> Result<AssetId, LedgerError> {
    state.retrieve_asset(
        token,
        Some(token_id),
        AssetClass::NonFungibleOrSemiFungibleToken,
        op,
    )
}

fn wallet(
    state: &mut LedgerState,
    address: Address,
    op: RetrieveOperation,
) -> Result<AccountId, LedgerError> {
    state.retrieve_account(&AccountKey::Wallet(address), op)
}

/// Transfer receivers are created on first use.
fn opaque(state: &mut LedgerState, key: B256) -> Result<AccountId, LedgerError> {
    state.retrieve_account(&AccountKey::Opaque(key), FindOrCreate)
}

/// One mutation per (id, amount) pair, in array order.
fn batch(
    state: &mut LedgerState,
    token: Address,
    token_ids: &[U256],
    amounts: &[U256],
    op: RetrieveOperation,
    mutation: impl Fn(AssetId, U256) -> Mutation,
) -> Result<Vec<Mutation>, LedgerError> {
    token_ids
        .iter()
        .zip(amounts)
        .map(|(token_id, amount)| {
            let asset = identified(state, token, *token_id, op)?;
            Ok(mutation(asset, *amount))
        })
        .collect()
}

fn absent_as_none<T>(result: Result<T, LedgerError>) -> Result<Option<T>, LedgerError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(LedgerError::AssetNotFound { .. } | LedgerError::AccountNotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}
