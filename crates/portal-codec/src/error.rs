use thiserror::Error;

/// Canonical error type exposed by the codec.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Length, offset or field validation failure.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A selector is present but belongs to another decoder.
    #[error("invalid function selector: expected {expected:#010x}, got {found:#010x}")]
    InvalidSelector { expected: u32, found: u32 },

    /// No portal, selector or inspect method matches the input.
    #[error("unknown input type: {0}")]
    UnknownInputType(String),

    /// The decoded variant does not match the handler it was routed to.
    #[error("incompatible input: expected {expected}, got {found}")]
    IncompatibleInput {
        expected: &'static str,
        found: &'static str,
    },
}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput(reason.into())
    }
}

impl From<alloy_sol_types::Error> for CodecError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::MalformedInput(format!("abi decoding failed: {err}"))
    }
}
