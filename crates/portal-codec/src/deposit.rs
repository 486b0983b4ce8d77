//! Deposits, as relayed by the portals.
//!
//! Portals emit packed fixed fields (addresses are 20 bytes, not words)
//! followed by whatever the depositor attached. Only the batch portal uses
//! dynamic ABI encoding, with offsets measured from the end of its two
//! address fields.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

use crate::{
    abi::{Reader, WORD},
    error::CodecError,
};

const ADDR: usize = 20;

/// Start of the ABI encoded region of a batch deposit.
pub const BATCH_DEPOSIT_BASE: usize = 2 * ADDR;

mod params {
    alloy_sol_types::sol! {
        struct Erc1155Batch {
            uint256[] token_ids;
            uint256[] amounts;
            bytes base_layer_data;
            bytes exec_layer_data;
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EtherDeposit {
    pub sender: Address,
    pub amount: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl EtherDeposit {
    pub const MIN_LEN: usize = ADDR + WORD;

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "ether deposit")?;

        Ok(Self {
            sender: reader.address(0)?,
            amount: reader.uint(ADDR)?,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::MIN_LEN + self.exec_layer_data.len());
        buf.extend_from_slice(self.sender.as_slice());
        buf.extend(self.amount.to_be_bytes::<WORD>());
        buf.extend_from_slice(&self.exec_layer_data);
        buf
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc20Deposit {
    pub token: Address,
    pub sender: Address,
    pub amount: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc20Deposit {
    pub const MIN_LEN: usize = 2 * ADDR + WORD;

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc20 deposit")?;

        Ok(Self {
            token: reader.address(0)?,
            sender: reader.address(ADDR)?,
            amount: reader.uint(2 * ADDR)?,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = packed_prefix(&self.token, &self.sender);
        buf.extend(self.amount.to_be_bytes::<WORD>());
        buf.extend_from_slice(&self.exec_layer_data);
        buf
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc721Deposit {
    pub token: Address,
    pub sender: Address,
    pub token_id: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc721Deposit {
    pub const MIN_LEN: usize = 2 * ADDR + WORD;

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc721 deposit")?;

        Ok(Self {
            token: reader.address(0)?,
            sender: reader.address(ADDR)?,
            token_id: reader.uint(2 * ADDR)?,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = packed_prefix(&self.token, &self.sender);
        buf.extend(self.token_id.to_be_bytes::<WORD>());
        buf.extend_from_slice(&self.exec_layer_data);
        buf
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc1155SingleDeposit {
    pub token: Address,
    pub sender: Address,
    pub token_id: U256,
    pub amount: U256,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc1155SingleDeposit {
    pub const MIN_LEN: usize = 2 * ADDR + 2 * WORD;

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc1155 single deposit")?;

        Ok(Self {
            token: reader.address(0)?,
            sender: reader.address(ADDR)?,
            token_id: reader.uint(2 * ADDR)?,
            amount: reader.uint(2 * ADDR + WORD)?,
            exec_layer_data: reader.tail(Self::MIN_LEN).to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = packed_prefix(&self.token, &self.sender);
        buf.extend(self.token_id.to_be_bytes::<WORD>());
        buf.extend(self.amount.to_be_bytes::<WORD>());
        buf.extend_from_slice(&self.exec_layer_data);
        buf
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Erc1155BatchDeposit {
    pub token: Address,
    pub sender: Address,
    pub token_ids: Vec<U256>,
    pub amounts: Vec<U256>,
    #[serde(with = "crate::serde_hex")]
    pub base_layer_data: Vec<u8>,
    #[serde(with = "crate::serde_hex")]
    pub exec_layer_data: Vec<u8>,
}

impl Erc1155BatchDeposit {
    /// Two packed addresses plus the four head words.
    pub const MIN_LEN: usize = BATCH_DEPOSIT_BASE + 4 * WORD;

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let reader = Reader::new(buf);
        reader.ensure_len(Self::MIN_LEN, "erc1155 batch deposit")?;

        let params = params::Erc1155Batch::abi_decode_params(reader.tail(BATCH_DEPOSIT_BASE))?;
        ensure_pairs(&params.token_ids, &params.amounts)?;

        Ok(Self {
            token: reader.address(0)?,
            sender: reader.address(ADDR)?,
            token_ids: params.token_ids,
            amounts: params.amounts,
            base_layer_data: params.base_layer_data.to_vec(),
            exec_layer_data: params.exec_layer_data.to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = packed_prefix(&self.token, &self.sender);
        let params = params::Erc1155Batch {
            token_ids: self.token_ids.clone(),
            amounts: self.amounts.clone(),
            base_layer_data: self.base_layer_data.clone().into(),
            exec_layer_data: self.exec_layer_data.clone().into(),
        };
        buf.extend(params.abi_encode_params());
        buf
    }
}

fn packed_prefix(token: &Address, sender: &Address) -> Vec<u8> {
    let mut buf = Vec::with_capacity(2 * ADDR + 2 * WORD);
    buf.extend_from_slice(token.as_slice());
    buf.extend_from_slice(sender.as_slice());
    buf
}

pub(crate) fn ensure_pairs(token_ids: &[U256], amounts: &[U256]) -> Result<(), CodecError> {
    if token_ids.len() != amounts.len() {
        return Err(CodecError::malformed(format!(
            "batch has {} token ids but {} amounts",
            token_ids.len(),
            amounts.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ether_deposit_layout() {
        let mut buf = vec![0x11; 20];
        buf.extend(U256::from(5).to_be_bytes::<32>());
        buf.extend_from_slice(b"memo");

        let deposit = EtherDeposit::decode(&buf).unwrap();
        assert_eq!(deposit.sender, Address::repeat_byte(0x11));
        assert_eq!(deposit.amount, U256::from(5));
        assert_eq!(deposit.exec_layer_data, b"memo");
        assert_eq!(deposit.encode(), buf);
    }

    #[test]
    fn short_deposits_are_malformed() {
        assert!(matches!(
            EtherDeposit::decode(&[0u8; 51]),
            Err(CodecError::MalformedInput(_))
        ));
        assert!(matches!(
            Erc20Deposit::decode(&[0u8; 71]),
            Err(CodecError::MalformedInput(_))
        ));
        assert!(matches!(
            Erc721Deposit::decode(&[0u8; 71]),
            Err(CodecError::MalformedInput(_))
        ));
        assert!(matches!(
            Erc1155SingleDeposit::decode(&[0u8; 103]),
            Err(CodecError::MalformedInput(_))
        ));
        assert!(matches!(
            Erc1155BatchDeposit::decode(&[0u8; 100]),
            Err(CodecError::MalformedInput(_))
        ));
    }

    #[test]
    fn batch_deposit_keeps_pair_order() {
        let deposit = Erc1155BatchDeposit {
            token: Address::repeat_byte(0xaa),
            sender: Address::repeat_byte(0x11),
            token_ids: vec![U256::from(1), U256::from(2)],
            amounts: vec![U256::from(3), U256::from(4)],
            base_layer_data: vec![0xbe],
            exec_layer_data: b"exec".to_vec(),
        };
        let buf = deposit.encode();
        // first offset word points past the four head words
        assert_eq!(
            U256::from_be_slice(&buf[40..72]),
            U256::from(4 * WORD)
        );

        let decoded = Erc1155BatchDeposit::decode(&buf).unwrap();
        assert_eq!(decoded, deposit);
    }

    #[test]
    fn batch_deposit_with_mismatched_arrays_is_malformed() {
        let deposit = Erc1155BatchDeposit {
            token: Address::repeat_byte(0xaa),
            sender: Address::repeat_byte(0x11),
            token_ids: vec![U256::from(1), U256::from(2)],
            amounts: vec![U256::from(3)],
            base_layer_data: Vec::new(),
            exec_layer_data: Vec::new(),
        };
        assert!(matches!(
            Erc1155BatchDeposit::decode(&deposit.encode()),
            Err(CodecError::MalformedInput(_))
        ));
    }

    #[test]
    fn batch_deposit_with_truncated_array_is_malformed() {
        let deposit = Erc1155BatchDeposit {
            token: Address::repeat_byte(0xaa),
            sender: Address::repeat_byte(0x11),
            token_ids: vec![U256::from(1); 3],
            amounts: vec![U256::from(1); 3],
            base_layer_data: Vec::new(),
            exec_layer_data: Vec::new(),
        };
        let buf = deposit.encode();
        assert!(matches!(
            Erc1155BatchDeposit::decode(&buf[..buf.len() - 1]),
            Err(CodecError::MalformedInput(_))
        ));
    }
}
