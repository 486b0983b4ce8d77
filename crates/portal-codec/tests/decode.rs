use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use portal_codec::{
    decode_advance, decode_inspect,
    deposit::{Erc1155BatchDeposit, EtherDeposit},
    input::decode_deposit,
    transfer::{self, Erc1155BatchTransfer, Erc20Transfer},
    voucher::{decode_erc20_transfer_call, erc20_voucher, VoucherCall},
    withdrawal::{self, Erc1155BatchWithdrawal, Erc20Withdrawal, EtherWithdrawal},
    AccountParam, AdvanceInput, BalanceQuery, CodecError, InspectQuery, Portals, TokenStandard,
};
use proptest::prelude::*;

fn user() -> Address {
    Address::repeat_byte(0x11)
}

#[test]
fn ether_deposit_from_portal() {
    let portals = Portals::default();
    let payload = hex::decode(format!(
        "{}{}",
        "11".repeat(20),
        "0000000000000000000000000000000000000000000000000000000000000005"
    ))
    .unwrap();

    let input = decode_advance(&portals, &portals.ether, &payload).unwrap();
    let deposit = EtherDeposit::try_from(input).unwrap();
    assert_eq!(deposit.sender, user());
    assert_eq!(deposit.amount, U256::from(5));
    assert!(deposit.exec_layer_data.is_empty());
}

#[test]
fn batch_deposit_pairs_in_order() {
    let portals = Portals::default();
    let payload = Erc1155BatchDeposit {
        token: Address::repeat_byte(0xaa),
        sender: user(),
        token_ids: vec![U256::from(1), U256::from(2)],
        amounts: vec![U256::from(3), U256::from(4)],
        base_layer_data: Vec::new(),
        exec_layer_data: Vec::new(),
    }
    .encode();

    let input = decode_advance(&portals, &portals.erc1155_batch, &payload).unwrap();
    let deposit = Erc1155BatchDeposit::try_from(input).unwrap();
    let pairs: Vec<_> = deposit.token_ids.iter().zip(&deposit.amounts).collect();
    assert_eq!(
        pairs,
        vec![
            (&U256::from(1), &U256::from(3)),
            (&U256::from(2), &U256::from(4))
        ]
    );
}

#[test]
fn every_operation_survives_the_selector_router() {
    let portals = Portals::default();
    let caller = Address::repeat_byte(0x42);
    let inputs: Vec<AdvanceInput> = vec![
        EtherWithdrawal {
            amount: U256::from(1),
            exec_layer_data: b"tail".to_vec(),
        }
        .into(),
        Erc20Withdrawal {
            token: Address::repeat_byte(0xaa),
            amount: U256::MAX,
            exec_layer_data: Vec::new(),
        }
        .into(),
        Erc1155BatchWithdrawal {
            token: Address::repeat_byte(0xaa),
            token_ids: vec![U256::from(1)],
            amounts: vec![U256::from(2)],
            exec_layer_data: vec![9; 40],
        }
        .into(),
        Erc20Transfer {
            token: Address::repeat_byte(0xaa),
            receiver: B256::repeat_byte(0xbb),
            amount: U256::from(3),
            exec_layer_data: Vec::new(),
        }
        .into(),
        Erc1155BatchTransfer {
            token: Address::repeat_byte(0xaa),
            receiver: B256::repeat_byte(0xbb),
            token_ids: vec![U256::from(1), U256::from(2), U256::from(3)],
            amounts: vec![U256::from(4), U256::from(5), U256::from(6)],
            exec_layer_data: Vec::new(),
        }
        .into(),
    ];

    for input in inputs {
        let decoded = decode_advance(&portals, &caller, &input.encode()).unwrap();
        assert_eq!(decoded, input);
    }
}

#[test]
fn deposits_are_only_decoded_for_their_portal() {
    let portals = Portals::default();
    let payload = [0u8; 72];
    // same bytes, different portal, different decoder
    assert_eq!(
        decode_advance(&portals, &portals.erc20, &payload).unwrap().name(),
        "erc20_deposit"
    );
    assert_eq!(
        decode_advance(&portals, &portals.erc721, &payload).unwrap().name(),
        "erc721_deposit"
    );
    assert!(matches!(
        decode_advance(&portals, &portals.erc1155_single, &payload),
        Err(CodecError::MalformedInput(_))
    ));
}

#[test]
fn short_withdrawals_are_malformed() {
    let portals = Portals::default();
    for standard in TokenStandard::ALL {
        let payload = standard.withdraw_selector().to_be_bytes();
        assert!(
            matches!(
                decode_advance(&portals, &user(), &payload),
                Err(CodecError::MalformedInput(_))
            ),
            "{standard} withdrawal with no body"
        );
    }
}

#[test]
fn withdrawal_with_abi_bytes_keeps_them_as_trailing_data() {
    // the exec data travels as an ABI `bytes` param; it is kept verbatim
    let body = (
        Address::repeat_byte(0xaa),
        U256::from(9),
        Bytes::from_static(b"memo"),
    )
        .abi_encode_params();
    let payload = [&withdrawal::WITHDRAW_ERC20.to_be_bytes()[..], &body[..]].concat();

    let decoded = Erc20Withdrawal::decode(&payload).unwrap();
    assert_eq!(decoded.token, Address::repeat_byte(0xaa));
    assert_eq!(decoded.amount, U256::from(9));
    assert_eq!(decoded.exec_layer_data, body[64..]);
    assert_eq!(decoded.encode(), payload);
}

#[test]
fn batch_deposit_tail_is_standard_abi() {
    let tail = (
        vec![U256::from(1), U256::from(2)],
        vec![U256::from(10), U256::from(20)],
        Bytes::from_static(b"base"),
        Bytes::from_static(b"exec"),
    )
        .abi_encode_params();
    let payload = [
        Address::repeat_byte(0xaa).as_slice(),
        user().as_slice(),
        &tail[..],
    ]
    .concat();

    let portals = Portals::default();
    let input = decode_advance(&portals, &portals.erc1155_batch, &payload).unwrap();
    let deposit = Erc1155BatchDeposit::try_from(input).unwrap();
    assert_eq!(deposit.token_ids, [U256::from(1), U256::from(2)]);
    assert_eq!(deposit.amounts, [U256::from(10), U256::from(20)]);
    assert_eq!(deposit.base_layer_data, b"base");
    assert_eq!(deposit.exec_layer_data, b"exec");
    assert_eq!(deposit.encode(), payload);
}

#[test]
fn per_class_decoders_check_their_selector() {
    let mut payload = transfer::TRANSFER_ETHER.to_be_bytes().to_vec();
    payload.resize(200, 0);
    assert_eq!(
        Erc20Withdrawal::decode(&payload),
        Err(CodecError::InvalidSelector {
            expected: withdrawal::WITHDRAW_ERC20,
            found: transfer::TRANSFER_ETHER,
        })
    );
}

#[test]
fn erc20_voucher_round_trip() {
    let token = Address::repeat_byte(0xaa);
    let receiver = Address::repeat_byte(0xbb);
    let amount = U256::from(123_456_789u64);

    let voucher = erc20_voucher(token, receiver, amount);
    assert_eq!(
        decode_erc20_transfer_call(&voucher).unwrap(),
        (token, receiver, amount)
    );
    assert_eq!(
        VoucherCall::decode(&voucher.payload).unwrap(),
        VoucherCall::Erc20Transfer {
            to: receiver,
            amount
        }
    );
}

#[test]
fn balance_query_by_account_only() {
    let query = decode_inspect(
        br#"{"method":"ledger_getBalance","params":["0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"]}"#,
    )
    .unwrap();
    assert_eq!(
        query,
        InspectQuery::Balance(BalanceQuery::Account {
            account: AccountParam::Wallet(Address::repeat_byte(0xaa)),
        })
    );
}

#[test]
fn batch_arrays_with_huge_lengths_are_malformed() {
    let mut payload = Erc1155BatchWithdrawal {
        token: Address::repeat_byte(0xaa),
        token_ids: vec![U256::from(1)],
        amounts: vec![U256::from(1)],
        exec_layer_data: Vec::new(),
    }
    .encode();
    // overwrite the ids length word with 2^255
    let ids_len_at = 4 + 3 * 32;
    payload[ids_len_at] = 0x80;
    assert!(matches!(
        Erc1155BatchWithdrawal::decode(&payload),
        Err(CodecError::MalformedInput(_))
    ));
}

proptest! {
    /// Arbitrary bytes from an arbitrary sender never make the router panic.
    #[test]
    fn decode_advance_never_panics(
        payload in prop::collection::vec(any::<u8>(), 0..512),
        sender in any::<[u8; 20]>(),
    ) {
        let _ = decode_advance(&Portals::default(), &Address::from(sender), &payload);
    }

    /// Valid selectors followed by garbage exercise every offset check.
    #[test]
    fn selector_decoders_never_panic(
        index in 0usize..5,
        is_transfer in any::<bool>(),
        body in prop::collection::vec(any::<u8>(), 0..384),
    ) {
        let standard = TokenStandard::ALL[index];
        let selector = if is_transfer {
            standard.transfer_selector()
        } else {
            standard.withdraw_selector()
        };
        let mut payload = selector.to_be_bytes().to_vec();
        payload.extend(body);
        let _ = decode_advance(&Portals::default(), &Address::ZERO, &payload);
    }

    #[test]
    fn deposit_decoders_never_panic(
        index in 0usize..5,
        payload in prop::collection::vec(any::<u8>(), 0..384),
    ) {
        let _ = decode_deposit(TokenStandard::ALL[index], &payload);
    }

    #[test]
    fn query_decoders_never_panic(payload in prop::collection::vec(any::<u8>(), 0..160)) {
        let _ = decode_inspect(&payload);
        let _ = VoucherCall::decode(&payload);
    }

    #[test]
    fn erc20_voucher_decodes_to_its_arguments(
        token in any::<[u8; 20]>(),
        receiver in any::<[u8; 20]>(),
        amount in any::<[u8; 32]>(),
    ) {
        let (token, receiver) = (Address::from(token), Address::from(receiver));
        let amount = U256::from_be_bytes(amount);
        let voucher = erc20_voucher(token, receiver, amount);
        prop_assert_eq!(decode_erc20_transfer_call(&voucher).unwrap(), (token, receiver, amount));
    }
}
