//! Wire codec for portal asset inputs.
//!
//! The crate turns raw advance payloads into typed asset operations and
//! produces the payloads that leave the application:
//!
//! * [`input`]: routing of advance payloads by portal sender or selector,
//!   backed by the per-class layouts in [`deposit`], [`withdrawal`] and
//!   [`transfer`].
//! * [`inspect`]: balance and supply queries.
//! * [`voucher`] and [`output`]: token calls that redeem withdrawals and the
//!   envelopes they travel in.
//! * [`abi`]: the packed-field reader; standard ABI regions go through
//!   `sol!` bindings declared next to the types that own them.
//!
//! Every decoder validates offsets and lengths before reading and reports
//! failures through [`CodecError`]; no input makes a decoder panic.

pub mod abi;
pub mod deposit;
pub mod input;
pub mod inspect;
pub mod output;
pub mod portal;
pub mod serde_hex;
pub mod transfer;
pub mod voucher;
pub mod withdrawal;

mod error;

pub use error::CodecError;
pub use input::{decode_advance, AdvanceInput, OperationKind, TokenStandard};
pub use inspect::{decode_inspect, AccountParam, BalanceQuery, InspectQuery, SupplyQuery};
pub use output::Output;
pub use portal::Portals;
pub use voucher::{DelegateCallVoucher, Voucher};
