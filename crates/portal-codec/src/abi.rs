//! Solidity ABI plumbing shared by the decoders.
//!
//! Standard ABI regions are declared with `sol!` next to the type that owns
//! them and handled by alloy-sol-types. [`Reader`] covers the rest: the raw
//! selector, the packed 20-byte addresses the portals emit and fixed words
//! at byte offsets.

use alloy_primitives::{Address, U256};

use crate::error::CodecError;

/// Size of an ABI word.
pub const WORD: usize = 32;

/// Size of a function selector.
pub const SELECTOR_LEN: usize = 4;

const ADDRESS_LEN: usize = 20;

/// Bounds-checked reader over a packed buffer.
#[derive(Clone, Copy, Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Fail unless the buffer holds at least `min` bytes.
    pub fn ensure_len(&self, min: usize, what: &str) -> Result<(), CodecError> {
        if self.buf.len() < min {
            return Err(CodecError::malformed(format!(
                "{what} should be at least {min} bytes, got: {}",
                self.buf.len()
            )));
        }
        Ok(())
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], CodecError> {
        let end = offset
            .checked_add(len)
            .ok_or_else(|| CodecError::malformed("byte range overflows"))?;
        self.buf.get(offset..end).ok_or_else(|| {
            CodecError::malformed(format!(
                "read of {offset}..{end} past end of {}-byte payload",
                self.buf.len()
            ))
        })
    }

    /// Everything from `offset` to the end of the buffer; empty when `offset`
    /// is at or past the end.
    pub fn tail(&self, offset: usize) -> &'a [u8] {
        self.buf.get(offset..).unwrap_or_default()
    }

    /// The leading 4-byte big-endian selector.
    pub fn selector(&self) -> Result<u32, CodecError> {
        let raw = self.bytes(0, SELECTOR_LEN)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn expect_selector(&self, expected: u32) -> Result<(), CodecError> {
        let found = self.selector()?;
        if found != expected {
            return Err(CodecError::InvalidSelector { expected, found });
        }
        Ok(())
    }

    /// A packed 20-byte address.
    pub fn address(&self, offset: usize) -> Result<Address, CodecError> {
        Ok(Address::from_slice(self.bytes(offset, ADDRESS_LEN)?))
    }

    pub fn uint(&self, offset: usize) -> Result<U256, CodecError> {
        Ok(U256::from_be_slice(self.bytes(offset, WORD)?))
    }
}

/// `selector ++ params ++ trailing`.
pub fn with_selector(selector: u32, params: Vec<u8>, trailing: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SELECTOR_LEN + params.len() + trailing.len());
    buf.extend(selector.to_be_bytes());
    buf.extend(params);
    buf.extend_from_slice(trailing);
    buf
}
