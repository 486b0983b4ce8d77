//! Withdrawal requests submitted by account holders.
//!
//! Every payload is `selector ++ abi params ++ trailing`, where the trailing
//! bytes are passed through untouched as application data. The batch form
//! carries its application data as an optional fourth ABI parameter instead.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

use crate::{
    abi::{with_selector, Reader, SELECTOR_LEN, WORD},
    deposit::ensure_pairs,
    error::CodecError,
};

pub const WITHDRAW_ETHER: u32 = 0x8cf7_0f0b;
pub const WITHDRAW_ERC20: u32 = 0x4f94_d342;
pub const WITHDRAW_ERC721: u32 = 0x33ac_f293;
pub const WITHDRAW_ERC1155_SINGLE: u32 = 0x8bb0_a811;
pub const WITHDRAW_ERC1155_BATCH: u32 = 0x50c8_0019;

mod params {
    alloy_sol_types::sol! {
        struct Ether {
            uint256 amount;
        }

        struct Erc20 {
            address token;
            uint256 amount;
        }

        struct Erc721 {
            address token;
            uint256 token_id;
        }

        struct Erc1155Single {
            address token;
            uint256 token_id;
            uint256 amount;
        }

        struct Erc1155Batch {
            address token;
            uint256[] token_ids;
            uint256[] amounts;
        }

        struct Erc1155BatchWithData {
            address token;
            uint256[] token_ids;
            uint256[] amounts;
            bytes exec_layer_data;
        }
    }
}

const fn head(words: usize) -> usize {
    SELECTOR_LEN + words * WORD
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EtherWithdrawal {
    pub amount: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl EtherWithdrawal {
    pub const MIN_LEN: usize = head(1);

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "ether withdrawal")?;
        reader.expect_selector(WITHDRAW_ETHER)?;

        let params = params::Ether::abi_decode_params(reader.tail(SELECTOR_LEN))?;
        Ok(Self {
            amount: params.amount,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let params = params::Ether {
            amount: self.amount,
        };
        with_selector(
            WITHDRAW_ETHER,
            params.abi_encode_params(),
            &self.exec_layer_data,
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc20Withdrawal {
    pub token: Address,
    pub amount: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc20Withdrawal {
    pub const MIN_LEN: usize = head(2);

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc20 withdrawal")?;
        reader.expect_selector(WITHDRAW_ERC20)?;

        let params = params::Erc20::abi_decode_params(reader.tail(SELECTOR_LEN))?;
        Ok(Self {
            token: params.token,
            amount: params.amount,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let params = params::Erc20 {
            token: self.token,
            amount: self.amount,
        };
        with_selector(
            WITHDRAW_ERC20,
            params.abi_encode_params(),
            &self.exec_layer_data,
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc721Withdrawal {
    pub token: Address,
    pub token_id: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc721Withdrawal {
    pub const MIN_LEN: usize = head(2);

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc721 withdrawal")?;
        reader.expect_selector(WITHDRAW_ERC721)?;

        let params = params::Erc721::abi_decode_params(reader.tail(SELECTOR_LEN))?;
        Ok(Self {
            token: params.token,
            token_id: params.token_id,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let params = params::Erc721 {
            token: self.token,
            token_id: self.token_id,
        };
        with_selector(
            WITHDRAW_ERC721,
            params.abi_encode_params(),
            &self.exec_layer_data,
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc1155SingleWithdrawal {
    pub token: Address,
    pub token_id: U256,
    pub amount: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc1155SingleWithdrawal {
    pub const MIN_LEN: usize = head(3);

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc1155 single withdrawal")?;
        reader.expect_selector(WITHDRAW_ERC1155_SINGLE)?;

        let params = params::Erc1155Single::abi_decode_params(reader.tail(SELECTOR_LEN))?;
        Ok(Self {
            token: params.token,
            token_id: params.token_id,
            amount: params.amount,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let params = params::Erc1155Single {
            token: self.token,
            token_id: self.token_id,
            amount: self.amount,
        };
        with_selector(
            WITHDRAW_ERC1155_SINGLE,
            params.abi_encode_params(),
            &self.exec_layer_data,
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc1155BatchWithdrawal {
    pub token: Address,
    pub token_ids: Vec<U256>,
    pub amounts: Vec<U256>,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc1155BatchWithdrawal {
    /// Selector, token word and the two array offsets.
    pub const MIN_LEN: usize = head(3);

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc1155 batch withdrawal")?;
        reader.expect_selector(WITHDRAW_ERC1155_BATCH)?;

        // a fourth head word is present only when the arrays start after it
        let body = reader.tail(SELECTOR_LEN);
        let withdrawal = if reader.uint(head(1))? >= U256::from(4 * WORD) {
            let params = params::Erc1155BatchWithData::abi_decode_params(body)?;
            Self {
                token: params.token,
                token_ids: params.token_ids,
                amounts: params.amounts,
                exec_layer_data: params.exec_layer_data.to_vec(),
            }
        } else {
            let params = params::Erc1155Batch::abi_decode_params(body)?;
            Self {
                token: params.token,
                token_ids: params.token_ids,
                amounts: params.amounts,
                exec_layer_data: Vec::new(),
            }
        };
        ensure_pairs(&withdrawal.token_ids, &withdrawal.amounts)?;
        Ok(withdrawal)
    }

    pub fn encode(&self) -> Vec<u8> {
        let params = if self.exec_layer_data.is_empty() {
            params::Erc1155Batch {
                token: self.token,
                token_ids: self.token_ids.clone(),
                amounts: self.amounts.clone(),
            }
            .abi_encode_params()
        } else {
            params::Erc1155BatchWithData {
                token: self.token,
                token_ids: self.token_ids.clone(),
                amounts: self.amounts.clone(),
                exec_layer_data: self.exec_layer_data.clone().into(),
            }
            .abi_encode_params()
        };
        with_selector(WITHDRAW_ERC1155_BATCH, params, &[])
    }
}
