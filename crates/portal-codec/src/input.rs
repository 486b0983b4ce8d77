//! Routing of raw advance payloads to the per-class decoders.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{
    abi::Reader,
    deposit::{Erc1155BatchDeposit, Erc1155SingleDeposit, Erc20Deposit, Erc721Deposit, EtherDeposit},
    error::CodecError,
    portal::Portals,
    transfer::{self, Erc1155BatchTransfer, Erc1155SingleTransfer, Erc20Transfer, Erc721Transfer, EtherTransfer},
    withdrawal::{
        self, Erc1155BatchWithdrawal, Erc1155SingleWithdrawal, Erc20Withdrawal, Erc721Withdrawal,
        EtherWithdrawal,
    },
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TokenStandard {
    Ether,
    Erc20,
    Erc721,
    Erc1155Single,
    Erc1155Batch,
}

impl TokenStandard {
    pub const ALL: [TokenStandard; 5] = [
        TokenStandard::Ether,
        TokenStandard::Erc20,
        TokenStandard::Erc721,
        TokenStandard::Erc1155Single,
        TokenStandard::Erc1155Batch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TokenStandard::Ether => "ether",
            TokenStandard::Erc20 => "erc20",
            TokenStandard::Erc721 => "erc721",
            TokenStandard::Erc1155Single => "erc1155_single",
            TokenStandard::Erc1155Batch => "erc1155_batch",
        }
    }

    pub fn withdraw_selector(self) -> u32 {
        match self {
            TokenStandard::Ether => withdrawal::WITHDRAW_ETHER,
            TokenStandard::Erc20 => withdrawal::WITHDRAW_ERC20,
            TokenStandard::Erc721 => withdrawal::WITHDRAW_ERC721,
            TokenStandard::Erc1155Single => withdrawal::WITHDRAW_ERC1155_SINGLE,
            TokenStandard::Erc1155Batch => withdrawal::WITHDRAW_ERC1155_BATCH,
        }
    }

    pub fn transfer_selector(self) -> u32 {
        match self {
            TokenStandard::Ether => transfer::TRANSFER_ETHER,
            TokenStandard::Erc20 => transfer::TRANSFER_ERC20,
            TokenStandard::Erc721 => transfer::TRANSFER_ERC721,
            TokenStandard::Erc1155Single => transfer::TRANSFER_ERC1155_SINGLE,
            TokenStandard::Erc1155Batch => transfer::TRANSFER_ERC1155_BATCH,
        }
    }
}

impl fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Deposit,
    Withdrawal,
    Transfer,
}

/// A decoded advance payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdvanceInput {
    EtherDeposit(EtherDeposit),
    Erc20Deposit(Erc20Deposit),
    Erc721Deposit(Erc721Deposit),
    Erc1155SingleDeposit(Erc1155SingleDeposit),
    Erc1155BatchDeposit(Erc1155BatchDeposit),
    EtherWithdrawal(EtherWithdrawal),
    Erc20Withdrawal(Erc20Withdrawal),
    Erc721Withdrawal(Erc721Withdrawal),
    Erc1155SingleWithdrawal(Erc1155SingleWithdrawal),
    Erc1155BatchWithdrawal(Erc1155BatchWithdrawal),
    EtherTransfer(EtherTransfer),
    Erc20Transfer(Erc20Transfer),
    Erc721Transfer(Erc721Transfer),
    Erc1155SingleTransfer(Erc1155SingleTransfer),
    Erc1155BatchTransfer(Erc1155BatchTransfer),
}

macro_rules! advance_variants {
    ($($variant:ident => $name:literal, $kind:ident, $standard:ident;)*) => {
        impl AdvanceInput {
            pub fn name(&self) -> &'static str {
                match self {
                    $(AdvanceInput::$variant(_) => $name,)*
                }
            }

            pub fn kind(&self) -> OperationKind {
                match self {
                    $(AdvanceInput::$variant(_) => OperationKind::$kind,)*
                }
            }

            pub fn standard(&self) -> TokenStandard {
                match self {
                    $(AdvanceInput::$variant(_) => TokenStandard::$standard,)*
                }
            }

            /// Re-encode into the payload the decoder accepts.
            pub fn encode(&self) -> Vec<u8> {
                match self {
                    $(AdvanceInput::$variant(inner) => inner.encode(),)*
                }
            }
        }

        $(
            impl From<$variant> for AdvanceInput {
                fn from(inner: $variant) -> Self {
                    AdvanceInput::$variant(inner)
                }
            }

            impl TryFrom<AdvanceInput> for $variant {
                type Error = CodecError;

                fn try_from(input: AdvanceInput) -> Result<Self, Self::Error> {
                    match input {
                        AdvanceInput::$variant(inner) => Ok(inner),
                        other => Err(CodecError::IncompatibleInput {
                            expected: $name,
                            found: other.name(),
                        }),
                    }
                }
            }
        )*
    };
}

advance_variants! {
    EtherDeposit => "ether_deposit", Deposit, Ether;
    Erc20Deposit => "erc20_deposit", Deposit, Erc20;
    Erc721Deposit => "erc721_deposit", Deposit, Erc721;
    Erc1155SingleDeposit => "erc1155_single_deposit", Deposit, Erc1155Single;
    Erc1155BatchDeposit => "erc1155_batch_deposit", Deposit, Erc1155Batch;
    EtherWithdrawal => "ether_withdrawal", Withdrawal, Ether;
    Erc20Withdrawal => "erc20_withdrawal", Withdrawal, Erc20;
    Erc721Withdrawal => "erc721_withdrawal", Withdrawal, Erc721;
    Erc1155SingleWithdrawal => "erc1155_single_withdrawal", Withdrawal, Erc1155Single;
    Erc1155BatchWithdrawal => "erc1155_batch_withdrawal", Withdrawal, Erc1155Batch;
    EtherTransfer => "ether_transfer", Transfer, Ether;
    Erc20Transfer => "erc20_transfer", Transfer, Erc20;
    Erc721Transfer => "erc721_transfer", Transfer, Erc721;
    Erc1155SingleTransfer => "erc1155_single_transfer", Transfer, Erc1155Single;
    Erc1155BatchTransfer => "erc1155_batch_transfer", Transfer, Erc1155Batch;
}

/// Decode an advance payload. Payloads relayed by a portal are deposits of
/// that portal's standard; anything else is routed by its selector.
pub fn decode_advance(
    portals: &Portals,
    msg_sender: &Address,
    payload: &[u8],
) -> Result<AdvanceInput, CodecError> {
    match portals.standard_of(msg_sender) {
        Some(standard) => decode_deposit(standard, payload),
        None => decode_by_selector(payload),
    }
}

pub fn decode_deposit(standard: TokenStandard, payload: &[u8]) -> Result<AdvanceInput, CodecError> {
    Ok(match standard {
        TokenStandard::Ether => EtherDeposit::decode(payload)?.into(),
        TokenStandard::Erc20 => Erc20Deposit::decode(payload)?.into(),
        TokenStandard::Erc721 => Erc721Deposit::decode(payload)?.into(),
        TokenStandard::Erc1155Single => Erc1155SingleDeposit::decode(payload)?.into(),
        TokenStandard::Erc1155Batch => Erc1155BatchDeposit::decode(payload)?.into(),
    })
}

pub fn decode_by_selector(payload: &[u8]) -> Result<AdvanceInput, CodecError> {
    let reader = Reader::new(payload);
    let selector = reader.selector().map_err(|_| {
        CodecError::malformed(format!(
            "payload of {} bytes is too short for a selector",
            payload.len()
        ))
    })?;

    Ok(match selector {
        withdrawal::WITHDRAW_ETHER => EtherWithdrawal::decode(payload)?.into(),
        withdrawal::WITHDRAW_ERC20 => Erc20Withdrawal::decode(payload)?.into(),
        withdrawal::WITHDRAW_ERC721 => Erc721Withdrawal::decode(payload)?.into(),
        withdrawal::WITHDRAW_ERC1155_SINGLE => Erc1155SingleWithdrawal::decode(payload)?.into(),
        withdrawal::WITHDRAW_ERC1155_BATCH => Erc1155BatchWithdrawal::decode(payload)?.into(),
        transfer::TRANSFER_ETHER => EtherTransfer::decode(payload)?.into(),
        transfer::TRANSFER_ERC20 => Erc20Transfer::decode(payload)?.into(),
        transfer::TRANSFER_ERC721 => Erc721Transfer::decode(payload)?.into(),
        transfer::TRANSFER_ERC1155_SINGLE => Erc1155SingleTransfer::decode(payload)?.into(),
        transfer::TRANSFER_ERC1155_BATCH => Erc1155BatchTransfer::decode(payload)?.into(),
        other => {
            return Err(CodecError::UnknownInputType(format!(
                "no decoder for selector {other:#010x}"
            )))
        }
    })
}
