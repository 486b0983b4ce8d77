//! Base-layer calls that redeem withdrawn assets.
//!
//! Voucher payloads are executed verbatim by the token contracts, so they
//! must be exactly the standard ABI call encoding.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::{abi::Reader, error::CodecError};

pub mod tokens {
    alloy_sol_types::sol! {
        interface IERC20 {
            function transfer(address to, uint256 amount) external returns (bool);
        }

        interface IERC721 {
            function safeTransferFrom(address from, address to, uint256 tokenId) external;
        }

        interface IERC1155 {
            function safeTransferFrom(
                address from,
                address to,
                uint256 id,
                uint256 value,
                bytes data
            ) external;

            function safeBatchTransferFrom(
                address from,
                address to,
                uint256[] ids,
                uint256[] values,
                bytes data
            ) external;
        }
    }
}

use tokens::{IERC1155, IERC20, IERC721};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voucher {
    pub destination: Address,
    pub value: U256,
    #[serde(with = "crate::serde_hex")]
    pub payload: Vec<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DelegateCallVoucher {
    pub destination: Address,
    #[serde(with = "crate::serde_hex")]
    pub payload: Vec<u8>,
}

fn token_call(token: Address, payload: Vec<u8>) -> Voucher {
    Voucher {
        destination: token,
        value: U256::ZERO,
        payload,
    }
}

pub fn ether_voucher(receiver: Address, amount: U256) -> Voucher {
    Voucher {
        destination: receiver,
        value: amount,
        payload: Vec::new(),
    }
}

pub fn erc20_voucher(token: Address, receiver: Address, amount: U256) -> Voucher {
    let call = IERC20::transferCall {
        to: receiver,
        amount,
    };
    token_call(token, call.abi_encode())
}

pub fn erc721_voucher(token: Address, app_contract: Address, receiver: Address, token_id: U256) -> Voucher {
    let call = IERC721::safeTransferFromCall {
        from: app_contract,
        to: receiver,
        tokenId: token_id,
    };
    token_call(token, call.abi_encode())
}

pub fn erc1155_single_voucher(
    token: Address,
    app_contract: Address,
    receiver: Address,
    token_id: U256,
    amount: U256,
) -> Voucher {
    let call = IERC1155::safeTransferFromCall {
        from: app_contract,
        to: receiver,
        id: token_id,
        value: amount,
        data: Bytes::new(),
    };
    token_call(token, call.abi_encode())
}

pub fn erc1155_batch_voucher(
    token: Address,
    app_contract: Address,
    receiver: Address,
    token_ids: &[U256],
    amounts: &[U256],
) -> Voucher {
    let call = IERC1155::safeBatchTransferFromCall {
        from: app_contract,
        to: receiver,
        ids: token_ids.to_vec(),
        values: amounts.to_vec(),
        data: Bytes::new(),
    };
    token_call(token, call.abi_encode())
}

pub fn delegate_call_voucher(destination: Address, payload: Vec<u8>) -> DelegateCallVoucher {
    DelegateCallVoucher {
        destination,
        payload,
    }
}

/// A voucher payload read back into its call arguments.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "function", rename_all = "snake_case")]
pub enum VoucherCall {
    Erc20Transfer {
        to: Address,
        amount: U256,
    },
    Erc721SafeTransferFrom {
        from: Address,
        to: Address,
        token_id: U256,
    },
    Erc1155SafeTransferFrom {
        from: Address,
        to: Address,
        token_id: U256,
        amount: U256,
        #[serde(with = "crate::serde_hex")]
        data: Vec<u8>,
    },
    Erc1155SafeBatchTransferFrom {
        from: Address,
        to: Address,
        token_ids: Vec<U256>,
        amounts: Vec<U256>,
        #[serde(with = "crate::serde_hex")]
        data: Vec<u8>,
    },
}

impl VoucherCall {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        let selector = Reader::new(payload).selector()?.to_be_bytes();

        if selector == IERC20::transferCall::SELECTOR {
            let call = IERC20::transferCall::abi_decode(payload)?;
            Ok(Self::Erc20Transfer {
                to: call.to,
                amount: call.amount,
            })
        } else if selector == IERC721::safeTransferFromCall::SELECTOR {
            let call = IERC721::safeTransferFromCall::abi_decode(payload)?;
            Ok(Self::Erc721SafeTransferFrom {
                from: call.from,
                to: call.to,
                token_id: call.tokenId,
            })
        } else if selector == IERC1155::safeTransferFromCall::SELECTOR {
            let call = IERC1155::safeTransferFromCall::abi_decode(payload)?;
            Ok(Self::Erc1155SafeTransferFrom {
                from: call.from,
                to: call.to,
                token_id: call.id,
                amount: call.value,
                data: call.data.to_vec(),
            })
        } else if selector == IERC1155::safeBatchTransferFromCall::SELECTOR {
            let call = IERC1155::safeBatchTransferFromCall::abi_decode(payload)?;
            Ok(Self::Erc1155SafeBatchTransferFrom {
                from: call.from,
                to: call.to,
                token_ids: call.ids,
                amounts: call.values,
                data: call.data.to_vec(),
            })
        } else {
            Err(CodecError::UnknownInputType(format!(
                "no voucher call with selector 0x{}",
                hex::encode(selector)
            )))
        }
    }
}

/// Token, receiver and amount of an ERC-20 withdrawal voucher.
pub fn decode_erc20_transfer_call(voucher: &Voucher) -> Result<(Address, Address, U256), CodecError> {
    Reader::new(&voucher.payload)
        .expect_selector(u32::from_be_bytes(IERC20::transferCall::SELECTOR))?;
    let call = IERC20::transferCall::abi_decode(&voucher.payload)?;
    Ok((voucher.destination, call.to, call.amount))
}
