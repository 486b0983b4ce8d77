//! Transfers between ledger accounts.
//!
//! Same framing as withdrawals; the receiver is an opaque 32-byte account
//! key rather than a wallet address.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

use crate::{
    abi::{with_selector, Reader, SELECTOR_LEN, WORD},
    deposit::ensure_pairs,
    error::CodecError,
};

pub const TRANSFER_ETHER: u32 = 0xff67_c903;
pub const TRANSFER_ERC20: u32 = 0x03d6_1dcd;
pub const TRANSFER_ERC721: u32 = 0xaf61_5a5a;
pub const TRANSFER_ERC1155_SINGLE: u32 = 0xe1c9_13ed;
pub const TRANSFER_ERC1155_BATCH: u32 = 0x638a_c6f9;

mod params {
    alloy_sol_types::sol! {
        struct Ether {
            bytes32 receiver;
            uint256 amount;
        }

        struct Erc20 {
            address token;
            bytes32 receiver;
            uint256 amount;
        }

        struct Erc721 {
            address token;
            bytes32 receiver;
            uint256 token_id;
        }

        struct Erc1155Single {
            address token;
            bytes32 receiver;
            uint256 token_id;
            uint256 amount;
        }

        struct Erc1155Batch {
            address token;
            bytes32 receiver;
            uint256[] token_ids;
            uint256[] amounts;
        }

        struct Erc1155BatchWithData {
            address token;
            bytes32 receiver;
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
pub struct EtherTransfer {
    pub receiver: B256,
    pub amount: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl EtherTransfer {
    pub const MIN_LEN: usize = head(2);

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "ether transfer")?;
        reader.expect_selector(TRANSFER_ETHER)?;

        let params = params::Ether::abi_decode_params(reader.tail(SELECTOR_LEN))?;
        Ok(Self {
            receiver: params.receiver,
            amount: params.amount,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let params = params::Ether {
            receiver: self.receiver,
            amount: self.amount,
        };
        with_selector(
            TRANSFER_ETHER,
            params.abi_encode_params(),
            &self.exec_layer_data,
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc20Transfer {
    pub token: Address,
    pub receiver: B256,
    pub amount: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc20Transfer {
    pub const MIN_LEN: usize = head(3);

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc20 transfer")?;
        reader.expect_selector(TRANSFER_ERC20)?;

        let params = params::Erc20::abi_decode_params(reader.tail(SELECTOR_LEN))?;
        Ok(Self {
            token: params.token,
            receiver: params.receiver,
            amount: params.amount,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let params = params::Erc20 {
            token: self.token,
            receiver: self.receiver,
            amount: self.amount,
        };
        with_selector(
            TRANSFER_ERC20,
            params.abi_encode_params(),
            &self.exec_layer_data,
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc721Transfer {
    pub token: Address,
    pub receiver: B256,
    pub token_id: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc721Transfer {
    pub const MIN_LEN: usize = head(3);

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc721 transfer")?;
        reader.expect_selector(TRANSFER_ERC721)?;

        let params = params::Erc721::abi_decode_params(reader.tail(SELECTOR_LEN))?;
        Ok(Self {
            token: params.token,
            receiver: params.receiver,
            token_id: params.token_id,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let params = params::Erc721 {
            token: self.token,
            receiver: self.receiver,
            token_id: self.token_id,
        };
        with_selector(
            TRANSFER_ERC721,
            params.abi_encode_params(),
            &self.exec_layer_data,
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc1155SingleTransfer {
    pub token: Address,
    pub receiver: B256,
    pub token_id: U256,
    pub amount: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc1155SingleTransfer {
    pub const MIN_LEN: usize = head(4);

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc1155 single transfer")?;
        reader.expect_selector(TRANSFER_ERC1155_SINGLE)?;

        let params = params::Erc1155Single::abi_decode_params(reader.tail(SELECTOR_LEN))?;
        Ok(Self {
            token: params.token,
            receiver: params.receiver,
            token_id: params.token_id,
            amount: params.amount,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let params = params::Erc1155Single {
            token: self.token,
            receiver: self.receiver,
            token_id: self.token_id,
            amount: self.amount,
        };
        with_selector(
            TRANSFER_ERC1155_SINGLE,
            params.abi_encode_params(),
            &self.exec_layer_data,
        )
    }
}

/// Token word first, then the receiver key, like every other transfer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc1155BatchTransfer {
    pub token: Address,
    pub receiver: B256,
    pub token_ids: Vec<U256>,
    pub amounts: Vec<U256>,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc1155BatchTransfer {
    pub const MIN_LEN: usize = head(4);

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc1155 batch transfer")?;
        reader.expect_selector(TRANSFER_ERC1155_BATCH)?;

        let body = reader.tail(SELECTOR_LEN);
        let transfer = if reader.uint(head(2))? >= U256::from(5 * WORD) {
            let params = params::Erc1155BatchWithData::abi_decode_params(body)?;
            Self {
                token: params.token,
                receiver: params.receiver,
                token_ids: params.token_ids,
                amounts: params.amounts,
                exec_layer_data: params.exec_layer_data.to_vec(),
            }
        } else {
            let params = params::Erc1155Batch::abi_decode_params(body)?;
            Self {
                token: params.token,
                receiver: params.receiver,
                token_ids: params.token_ids,
                amounts: params.amounts,
                exec_layer_data: Vec::new(),
            }
        };
        ensure_pairs(&transfer.token_ids, &transfer.amounts)?;
        Ok(transfer)
    }

    pub fn encode(&self) -> Vec<u8> {
        let params = if self.exec_layer_data.is_empty() {
            params::Erc1155Batch {
                token: self.token,
                receiver: self.receiver,
                token_ids: self.token_ids.clone(),
                amounts: self.amounts.clone(),
            }
            .abi_encode_params()
        } else {
            params::Erc1155BatchWithData {
                token: self.token,
                receiver: self.receiver,
                token_ids: self.token_ids.clone(),
                amounts: self.amounts.clone(),
                exec_layer_data: self.exec_layer_data.clone().into(),
            }
            .abi_encode_params()
        };
        with_selector(TRANSFER_ERC1155_BATCH, params, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ether_transfer_layout() {
        let transfer = EtherTransfer {
            receiver: B256::repeat_byte(0x22),
            amount: U256::from(7),
            exec_layer_data: Vec::new(),
        };
        let buf = transfer.encode();
        assert_eq!(buf.len(), 68);
        assert_eq!(&buf[4..36], B256::repeat_byte(0x22).as_slice());
        assert_eq!(EtherTransfer::decode(&buf).unwrap(), transfer);
    }

    #[test]
    fn short_transfers_are_malformed() {
        let mut buf = TRANSFER_ERC1155_SINGLE.to_be_bytes().to_vec();
        buf.resize(131, 0);
        assert!(matches!(
            Erc1155SingleTransfer::decode(&buf),
            Err(CodecError::MalformedInput(_))
        ));
    }

    #[test]
    fn batch_transfer_reads_token_then_receiver() {
        let transfer = Erc1155BatchTransfer {
            token: Address::repeat_byte(0xaa),
            receiver: B256::repeat_byte(0xbb),
            token_ids: vec![U256::from(5)],
            amounts: vec![U256::from(6)],
            exec_layer_data: b"x".to_vec(),
        };
        let buf = transfer.encode();
        assert_eq!(&buf[16..36], Address::repeat_byte(0xaa).as_slice());
        assert_eq!(&buf[36..68], B256::repeat_byte(0xbb).as_slice());
        assert_eq!(Erc1155BatchTransfer::decode(&buf).unwrap(), transfer);
    }

    #[test]
    fn batch_transfer_mismatched_arrays_are_malformed() {
        let params = params::Erc1155Batch {
            token: Address::ZERO,
            receiver: B256::ZERO,
            token_ids: vec![U256::from(1)],
            amounts: Vec::new(),
        };
        let buf = with_selector(TRANSFER_ERC1155_BATCH, params.abi_encode_params(), &[]);
        assert!(matches!(
            Erc1155BatchTransfer::decode(&buf),
            Err(CodecError::MalformedInput(_))
        ));
    }
}
