//! Request envelope around the dispatcher: what the settlement layer hands
//! in, and what goes back out.

use alloy_primitives::{Address, U256};
use portal_ledger::AssetLedger;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dispatch::Dispatcher;

pub use portal_codec::Output;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Metadata {
    pub chain_id: u64,
    pub app_contract: Address,
    pub msg_sender: Address,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub prev_randao: U256,
    pub index: u64,
}

/// A state-changing request.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvanceRequest {
    #[serde(flatten)]
    pub metadata: Metadata,
    #[serde(with = "portal_codec::serde_hex")]
    pub payload: Vec<u8>,
}

/// A read-only request.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InspectRequest {
    #[serde(with = "portal_codec::serde_hex")]
    pub payload: Vec<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Advance(AdvanceRequest),
    Inspect(InspectRequest),
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::Advance(_) => "advance",
            Request::Inspect(_) => "inspect",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    Accept,
    Reject,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Processed {
    pub status: Finish,
    pub outputs: Vec<Output>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run one request. A rejected request produces no outputs.
pub fn process<L: AssetLedger>(dispatcher: &Dispatcher<'_, L>, request: &Request) -> Processed {
    let result = match request {
        Request::Advance(advance) => dispatcher.advance(advance),
        Request::Inspect(inspect) => dispatcher.inspect(inspect),
    };

    match result {
        Ok(outputs) => {
            debug!(request = request.name(), outputs = outputs.len(), "request accepted");
            Processed {
                status: Finish::Accept,
                outputs,
                error: None,
            }
        }
        Err(err) => {
            warn!(request = request.name(), error = %err, "request rejected");
            Processed {
                status: Finish::Reject,
                outputs: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    }
}
