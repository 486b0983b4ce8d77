//! Portal asset ledger application: decoded portal inputs are applied to an
//! in-memory [`portal_ledger::Ledger`] and withdrawals leave as vouchers.

pub mod config;
pub mod dispatch;
pub mod rollup;

pub use config::PortalConfig;
pub use dispatch::{DispatchError, Dispatcher};
pub use rollup::{process, AdvanceRequest, Finish, InspectRequest, Metadata, Processed, Request};
