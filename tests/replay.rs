use std::{io::Write, process::Command};

use alloy_primitives::{address, Address, B256, U256};
use portal_cli::{process, AdvanceRequest, Dispatcher, Finish, InspectRequest, Metadata, Request};
use portal_codec::{
    deposit::EtherDeposit, portal::ETHER_PORTAL, transfer::EtherTransfer,
    withdrawal::EtherWithdrawal, Output, Portals,
};
use portal_ledger::Ledger;
use serde_json::{json, Value};

const ALICE: Address = address!("1111111111111111111111111111111111111111");

fn ether_deposit(amount: u64) -> Vec<u8> {
    EtherDeposit {
        sender: ALICE,
        amount: U256::from(amount),
        exec_layer_data: Vec::new(),
    }
    .encode()
}

fn ether_withdrawal(amount: u64) -> Vec<u8> {
    EtherWithdrawal {
        amount: U256::from(amount),
        exec_layer_data: Vec::new(),
    }
    .encode()
}

fn advance(msg_sender: Address, payload: Vec<u8>) -> Request {
    Request::Advance(AdvanceRequest {
        metadata: Metadata {
            msg_sender,
            ..Metadata::default()
        },
        payload,
    })
}

#[test]
fn rejected_request_leaves_ledger_untouched() {
    let ledger = Ledger::new();
    let dispatcher = Dispatcher::new(&ledger, Portals::default()).unwrap();

    let deposit = process(&dispatcher, &advance(ETHER_PORTAL, ether_deposit(5)));
    assert_eq!(deposit.status, Finish::Accept);
    assert!(deposit.outputs.is_empty());

    let before = ledger.snapshot();
    let over = process(&dispatcher, &advance(ALICE, ether_withdrawal(10)));
    assert_eq!(over.status, Finish::Reject);
    assert!(over.outputs.is_empty());
    assert!(over.error.is_some());
    assert_eq!(ledger.snapshot(), before);

    let query = Request::Inspect(InspectRequest {
        payload: format!(r#"{{"method":"ledger_getBalance","params":["{ALICE}"]}}"#).into_bytes(),
    });
    let answer = process(&dispatcher, &query);
    assert_eq!(
        answer.outputs,
        vec![Output::Report {
            payload: U256::from(5).to_be_bytes::<32>().to_vec()
        }]
    );
}

#[test]
fn rejected_transfer_leaves_no_receiver_account() {
    let ledger = Ledger::new();
    let dispatcher = Dispatcher::new(&ledger, Portals::default()).unwrap();
    process(&dispatcher, &advance(ETHER_PORTAL, ether_deposit(5)));

    let before = ledger.snapshot();
    let receiver = B256::repeat_byte(0x42);
    let transfer = EtherTransfer {
        receiver,
        amount: U256::from(10),
        exec_layer_data: Vec::new(),
    };
    let processed = process(&dispatcher, &advance(ALICE, transfer.encode()));
    assert_eq!(processed.status, Finish::Reject);
    assert_eq!(ledger.snapshot(), before);
    assert_eq!(ledger.snapshot().accounts.len(), 1);

    let query = Request::Inspect(InspectRequest {
        payload: format!(r#"{{"method":"ledger_getBalance","params":["{receiver}"]}}"#)
            .into_bytes(),
    });
    assert_eq!(
        process(&dispatcher, &query).outputs,
        vec![Output::Report {
            payload: vec![0; 32]
        }]
    );
}

#[test]
fn overflowing_deposit_leaves_no_sender_account() {
    let ledger = Ledger::new();
    let dispatcher = Dispatcher::new(&ledger, Portals::default()).unwrap();
    let full = EtherDeposit {
        sender: ALICE,
        amount: U256::MAX,
        exec_layer_data: Vec::new(),
    };
    let accepted = process(&dispatcher, &advance(ETHER_PORTAL, full.encode()));
    assert_eq!(accepted.status, Finish::Accept);

    let before = ledger.snapshot();
    let one_more = EtherDeposit {
        sender: address!("2222222222222222222222222222222222222222"),
        amount: U256::from(1),
        exec_layer_data: Vec::new(),
    };
    let processed = process(&dispatcher, &advance(ETHER_PORTAL, one_more.encode()));
    assert_eq!(processed.status, Finish::Reject);
    assert_eq!(ledger.snapshot(), before);
}

#[test]
fn unroutable_payload_is_rejected() {
    let ledger = Ledger::new();
    let dispatcher = Dispatcher::new(&ledger, Portals::default()).unwrap();
    let processed = process(&dispatcher, &advance(ALICE, vec![0xde, 0xad, 0xbe, 0xef]));
    assert_eq!(processed.status, Finish::Reject);
}

#[test]
fn replay_binary_reports_each_request() {
    let lines = [
        json!({
            "type": "advance",
            "msg_sender": ETHER_PORTAL,
            "payload": format!("0x{}", hex::encode(ether_deposit(5))),
        }),
        json!({
            "type": "advance",
            "msg_sender": ALICE,
            "payload": format!("0x{}", hex::encode(ether_withdrawal(10))),
        }),
        json!({
            "type": "advance",
            "msg_sender": ALICE,
            "payload": format!("0x{}", hex::encode(ether_withdrawal(2))),
        }),
        json!({
            "type": "inspect",
            "payload": hex::encode(br#"{"method":"ledger_getTotalSupply"}"#),
        }),
    ];

    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in &lines {
        writeln!(file, "{line}").unwrap();
    }
    writeln!(file).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_portal"))
        .arg("replay")
        .arg(file.path())
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let results: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(results.len(), 4);

    let statuses: Vec<&str> = results
        .iter()
        .map(|result| result["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["accept", "reject", "accept", "accept"]);

    assert_eq!(results[2]["outputs"][0]["type"], "voucher");
    let supply = results[3]["encoded"][0].as_str().unwrap();
    assert_eq!(supply, format!("0x{}", hex::encode(U256::from(3).to_be_bytes::<32>())));
}
