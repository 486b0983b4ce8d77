use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::voucher::{DelegateCallVoucher, Voucher};

pub mod envelope {
    alloy_sol_types::sol! {
        interface Outputs {
            function Notice(bytes payload) external;
            function Voucher(address destination, uint256 value, bytes payload) external;
            function DelegateCallVoucher(address destination, bytes payload) external;
        }
    }
}

use envelope::Outputs;

/// Anything a request hands back to the settlement layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Output {
    Notice {
        #[serde(with = "crate::serde_hex")]
        payload: Vec<u8>,
    },
    Voucher(Voucher),
    DelegateCallVoucher(DelegateCallVoucher),
    Report {
        #[serde(with = "crate::serde_hex")]
        payload: Vec<u8>,
    },
}

impl Output {
    pub fn name(&self) -> &'static str {
        match self {
            Output::Notice { .. } => "notice",
            Output::Voucher(_) => "voucher",
            Output::DelegateCallVoucher(_) => "delegate_call_voucher",
            Output::Report { .. } => "report",
        }
    }

    /// The bytes as the settlement layer receives them. Notices and vouchers
    /// are wrapped in their ABI envelope; reports are not.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Output::Notice { payload } => Outputs::NoticeCall {
                payload: payload.clone().into(),
            }
            .abi_encode(),
            Output::Voucher(voucher) => Outputs::VoucherCall {
                destination: voucher.destination,
                value: voucher.value,
                payload: voucher.payload.clone().into(),
            }
            .abi_encode(),
            Output::DelegateCallVoucher(voucher) => Outputs::DelegateCallVoucherCall {
                destination: voucher.destination,
                payload: voucher.payload.clone().into(),
            }
            .abi_encode(),
            Output::Report { payload } => payload.clone(),
        }
    }
}

impl From<Voucher> for Output {
    fn from(voucher: Voucher) -> Self {
        Output::Voucher(voucher)
    }
}

impl From<DelegateCallVoucher> for Output {
    fn from(voucher: DelegateCallVoucher) -> Self {
        Output::DelegateCallVoucher(voucher)
    }
}
