//! Read-only ledger queries.
//!
//! Queries arrive as JSON `{"method": ..., "params": [...]}`; the number of
//! params selects the query shape.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

pub const GET_BALANCE: &str = "ledger_getBalance";
pub const GET_TOTAL_SUPPLY: &str = "ledger_getTotalSupply";

const MAX_BALANCE_PARAMS: usize = 4;
const MAX_SUPPLY_PARAMS: usize = 3;

/// The account a balance query refers to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum AccountParam {
    Wallet(Address),
    Opaque(B256),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum BalanceQuery {
    Bare,
    Account {
        account: AccountParam,
    },
    AccountToken {
        account: AccountParam,
        token: Address,
    },
    AccountTokenId {
        account: AccountParam,
        token: Address,
        token_id: U256,
        #[serde(with = "crate::serde_hex")]
        exec_layer_data: Vec<u8>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SupplyQuery {
    Native,
    Token {
        token: Address,
    },
    TokenId {
        token: Address,
        token_id: U256,
        #[serde(with = "crate::serde_hex")]
        exec_layer_data: Vec<u8>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InspectQuery {
    Balance(BalanceQuery),
    Supply(SupplyQuery),
}

#[derive(Deserialize)]
struct RawQuery {
    method: String,
    #[serde(default)]
    params: Vec<String>,
}

pub fn decode_inspect(payload: &[u8]) -> Result<InspectQuery, CodecError> {
    let raw: RawQuery = serde_json::from_slice(payload)
        .map_err(|err| CodecError::malformed(format!("inspect payload is not a query: {err}")))?;

    match raw.method.as_str() {
        GET_BALANCE => balance_from_params(&raw.params).map(InspectQuery::Balance),
        GET_TOTAL_SUPPLY => supply_from_params(&raw.params).map(InspectQuery::Supply),
        other => Err(CodecError::UnknownInputType(format!(
            "unknown inspect method {other:?}"
        ))),
    }
}

fn balance_from_params(params: &[String]) -> Result<BalanceQuery, CodecError> {
    if params.len() > MAX_BALANCE_PARAMS {
        return Err(CodecError::malformed(format!(
            "{GET_BALANCE} takes at most {MAX_BALANCE_PARAMS} params, got {}",
            params.len()
        )));
    }

    Ok(match params {
        [] => BalanceQuery::Bare,
        [account] => BalanceQuery::Account {
            account: parse_account(account)?,
        },
        [account, token] => BalanceQuery::AccountToken {
            account: parse_account(account)?,
            token: parse_token(token)?,
        },
        [account, token, token_id, rest @ ..] => BalanceQuery::AccountTokenId {
            account: parse_account(account)?,
            token: parse_token(token)?,
            token_id: parse_token_id(token_id)?,
            exec_layer_data: rest.first().map(|data| data.as_bytes().to_vec()).unwrap_or_default(),
        },
    })
}

fn supply_from_params(params: &[String]) -> Result<SupplyQuery, CodecError> {
    if params.len() > MAX_SUPPLY_PARAMS {
        return Err(CodecError::malformed(format!(
            "{GET_TOTAL_SUPPLY} takes at most {MAX_SUPPLY_PARAMS} params, got {}",
            params.len()
        )));
    }

    Ok(match params {
        [] => SupplyQuery::Native,
        [token] => SupplyQuery::Token {
            token: parse_token(token)?,
        },
        [token, token_id, rest @ ..] => SupplyQuery::TokenId {
            token: parse_token(token)?,
            token_id: parse_token_id(token_id)?,
            exec_layer_data: rest.first().map(|data| data.as_bytes().to_vec()).unwrap_or_default(),
        },
    })
}

fn parse_hex(param: &str, what: &str) -> Result<Vec<u8>, CodecError> {
    let digits = param.strip_prefix("0x").unwrap_or(param);
    hex::decode(digits).map_err(|err| CodecError::malformed(format!("{what} {param:?}: {err}")))
}

/// Exactly 20 bytes name a wallet; anything up to 32 bytes is an opaque
/// key, right-aligned.
pub fn parse_account(param: &str) -> Result<AccountParam, CodecError> {
    let bytes = parse_hex(param, "account")?;
    match bytes.len() {
        20 => Ok(AccountParam::Wallet(Address::from_slice(&bytes))),
        len if len <= 32 => Ok(AccountParam::Opaque(B256::left_padding_from(&bytes))),
        len => Err(CodecError::malformed(format!(
            "account key is {len} bytes, at most 32 allowed"
        ))),
    }
}

pub fn parse_token(param: &str) -> Result<Address, CodecError> {
    let bytes = parse_hex(param, "token")?;
    if bytes.len() > 20 {
        return Err(CodecError::malformed(format!(
            "token address is {} bytes",
            bytes.len()
        )));
    }
    let mut raw = [0u8; 20];
    raw[20 - bytes.len()..].copy_from_slice(&bytes);
    Ok(Address::from(raw))
}

/// Decimal, or hex with a `0x` prefix.
pub fn parse_token_id(param: &str) -> Result<U256, CodecError> {
    param
        .parse::<U256>()
        .map_err(|err| CodecError::malformed(format!("token id {param:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(json: &str) -> Result<InspectQuery, CodecError> {
        decode_inspect(json.as_bytes())
    }

    #[test]
    fn balance_by_wallet() {
        let q = query(r#"{"method":"ledger_getBalance","params":["0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"]}"#)
            .unwrap();
        assert_eq!(
            q,
            InspectQuery::Balance(BalanceQuery::Account {
                account: AccountParam::Wallet(Address::repeat_byte(0xaa)),
            })
        );
    }

    #[test]
    fn balance_param_count_selects_shape() {
        let account = "0x".to_owned() + &"11".repeat(32);
        let token = "0x".to_owned() + &"22".repeat(20);

        assert_eq!(
            query(r#"{"method":"ledger_getBalance","params":[]}"#).unwrap(),
            InspectQuery::Balance(BalanceQuery::Bare)
        );
        let q = query(&format!(
            r#"{{"method":"ledger_getBalance","params":["{account}","{token}","0x10","memo"]}}"#
        ))
        .unwrap();
        assert_eq!(
            q,
            InspectQuery::Balance(BalanceQuery::AccountTokenId {
                account: AccountParam::Opaque(B256::repeat_byte(0x11)),
                token: Address::repeat_byte(0x22),
                token_id: U256::from(16),
                exec_layer_data: b"memo".to_vec(),
            })
        );
        let q = query(&format!(
            r#"{{"method":"ledger_getBalance","params":["{account}","{token}","16"]}}"#
        ))
        .unwrap();
        assert!(matches!(
            q,
            InspectQuery::Balance(BalanceQuery::AccountTokenId { token_id, ref exec_layer_data, .. })
                if token_id == U256::from(16) && exec_layer_data.is_empty()
        ));
    }

    #[test]
    fn too_many_params_are_malformed() {
        assert!(matches!(
            query(r#"{"method":"ledger_getBalance","params":["0x01","0x02","3","x","y"]}"#),
            Err(CodecError::MalformedInput(_))
        ));
        assert!(matches!(
            query(r#"{"method":"ledger_getTotalSupply","params":["0x02","3","x","y"]}"#),
            Err(CodecError::MalformedInput(_))
        ));
    }

    #[test]
    fn bad_params_are_malformed() {
        assert!(matches!(
            query(r#"{"method":"ledger_getBalance","params":["0xzz"]}"#),
            Err(CodecError::MalformedInput(_))
        ));
        assert!(matches!(
            query(r#"{"method":"ledger_getTotalSupply","params":["0x02","twelve"]}"#),
            Err(CodecError::MalformedInput(_))
        ));
        assert!(matches!(query("not json"), Err(CodecError::MalformedInput(_))));
    }

    #[test]
    fn unknown_method() {
        assert!(matches!(
            query(r#"{"method":"ledger_getAllowance","params":[]}"#),
            Err(CodecError::UnknownInputType(_))
        ));
    }

    #[test]
    fn short_account_keys_are_right_aligned() {
        let AccountParam::Opaque(key) = parse_account("0x0102").unwrap() else {
            panic!("expected opaque key");
        };
        assert_eq!(key[30..], [1, 2]);
        assert!(key[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn supply_queries() {
        assert_eq!(
            query(r#"{"method":"ledger_getTotalSupply"}"#).unwrap(),
            InspectQuery::Supply(SupplyQuery::Native)
        );
        assert_eq!(
            query(r#"{"method":"ledger_getTotalSupply","params":["0x2222222222222222222222222222222222222222"]}"#)
                .unwrap(),
            InspectQuery::Supply(SupplyQuery::Token {
                token: Address::repeat_byte(0x22)
            })
        );
    }
}
