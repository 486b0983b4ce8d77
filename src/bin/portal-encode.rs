//! Builds advance payloads for every portal input kind and prints them as hex.

use alloy_primitives::{Address, Bytes, B256, U256};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use portal_codec::{
    deposit::{
        Erc1155BatchDeposit, Erc1155SingleDeposit, Erc20Deposit, Erc721Deposit, EtherDeposit,
    },
    transfer::{
        Erc1155BatchTransfer, Erc1155SingleTransfer, Erc20Transfer, Erc721Transfer, EtherTransfer,
    },
    withdrawal::{
        Erc1155BatchWithdrawal, Erc1155SingleWithdrawal, Erc20Withdrawal, Erc721Withdrawal,
        EtherWithdrawal,
    },
    AdvanceInput,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portal-encode", version, about = "Build portal advance payloads")]
struct Cli {
    /// Print the decoded form as JSON next to the payload
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    kind: Kind,
}

#[derive(Args)]
struct Extra {
    #[arg(long, value_parser = parse_bytes)]
    exec_layer_data: Option<Bytes>,
}

impl Extra {
    fn bytes(self) -> Vec<u8> {
        self.exec_layer_data.map(|data| data.to_vec()).unwrap_or_default()
    }
}

#[derive(Subcommand)]
enum Kind {
    EtherDeposit {
        #[arg(long, value_parser = parse_address)]
        sender: Address,
        #[arg(long, value_parser = parse_u256)]
        amount: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc20Deposit {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_address)]
        sender: Address,
        #[arg(long, value_parser = parse_u256)]
        amount: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc721Deposit {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_address)]
        sender: Address,
        #[arg(long, value_parser = parse_u256)]
        token_id: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc1155SingleDeposit {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_address)]
        sender: Address,
        #[arg(long, value_parser = parse_u256)]
        token_id: U256,
        #[arg(long, value_parser = parse_u256)]
        amount: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc1155BatchDeposit {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_address)]
        sender: Address,
        #[arg(long, value_parser = parse_u256, value_delimiter = ',', required = true)]
        token_ids: Vec<U256>,
        #[arg(long, value_parser = parse_u256, value_delimiter = ',', required = true)]
        amounts: Vec<U256>,
        #[arg(long, value_parser = parse_bytes)]
        base_layer_data: Option<Bytes>,
        #[command(flatten)]
        extra: Extra,
    },
    EtherWithdrawal {
        #[arg(long, value_parser = parse_u256)]
        amount: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc20Withdrawal {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_u256)]
        amount: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc721Withdrawal {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_u256)]
        token_id: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc1155SingleWithdrawal {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_u256)]
        token_id: U256,
        #[arg(long, value_parser = parse_u256)]
        amount: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc1155BatchWithdrawal {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_u256, value_delimiter = ',', required = true)]
        token_ids: Vec<U256>,
        #[arg(long, value_parser = parse_u256, value_delimiter = ',', required = true)]
        amounts: Vec<U256>,
        #[command(flatten)]
        extra: Extra,
    },
    EtherTransfer {
        #[arg(long, value_parser = parse_receiver)]
        receiver: B256,
        #[arg(long, value_parser = parse_u256)]
        amount: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc20Transfer {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_receiver)]
        receiver: B256,
        #[arg(long, value_parser = parse_u256)]
        amount: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc721Transfer {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_receiver)]
        receiver: B256,
        #[arg(long, value_parser = parse_u256)]
        token_id: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc1155SingleTransfer {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_receiver)]
        receiver: B256,
        #[arg(long, value_parser = parse_u256)]
        token_id: U256,
        #[arg(long, value_parser = parse_u256)]
        amount: U256,
        #[command(flatten)]
        extra: Extra,
    },
    Erc1155BatchTransfer {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_receiver)]
        receiver: B256,
        #[arg(long, value_parser = parse_u256, value_delimiter = ',', required = true)]
        token_ids: Vec<U256>,
        #[arg(long, value_parser = parse_u256, value_delimiter = ',', required = true)]
        amounts: Vec<U256>,
        #[command(flatten)]
        extra: Extra,
    },
}

fn parse_address(value: &str) -> Result<Address, String> {
    value.parse().map_err(|e| format!("{e}"))
}

fn parse_u256(value: &str) -> Result<U256, String> {
    value.parse().map_err(|e| format!("{e}"))
}

fn parse_bytes(value: &str) -> Result<Bytes, String> {
    value.parse().map_err(|e| format!("{e}"))
}

/// Receiver keys shorter than 32 bytes are left-padded with zeros.
fn parse_receiver(value: &str) -> Result<B256, String> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(digits).map_err(|e| format!("{e}"))?;
    if bytes.len() > 32 {
        return Err(format!("receiver is {} bytes, at most 32 allowed", bytes.len()));
    }
    Ok(B256::left_padding_from(&bytes))
}

impl Kind {
    fn into_input(self) -> AdvanceInput {
        match self {
            Kind::EtherDeposit {
                sender,
                amount,
                extra,
            } => EtherDeposit {
                sender,
                amount,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc20Deposit {
                token,
                sender,
                amount,
                extra,
            } => Erc20Deposit {
                token,
                sender,
                amount,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc721Deposit {
                token,
                sender,
                token_id,
                extra,
            } => Erc721Deposit {
                token,
                sender,
                token_id,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc1155SingleDeposit {
                token,
                sender,
                token_id,
                amount,
                extra,
            } => Erc1155SingleDeposit {
                token,
                sender,
                token_id,
                amount,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc1155BatchDeposit {
                token,
                sender,
                token_ids,
                amounts,
                base_layer_data,
                extra,
            } => Erc1155BatchDeposit {
                token,
                sender,
                token_ids,
                amounts,
                base_layer_data: base_layer_data.map(|data| data.to_vec()).unwrap_or_default(),
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::EtherWithdrawal { amount, extra } => EtherWithdrawal {
                amount,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc20Withdrawal {
                token,
                amount,
                extra,
            } => Erc20Withdrawal {
                token,
                amount,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc721Withdrawal {
                token,
                token_id,
                extra,
            } => Erc721Withdrawal {
                token,
                token_id,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc1155SingleWithdrawal {
                token,
                token_id,
                amount,
                extra,
            } => Erc1155SingleWithdrawal {
                token,
                token_id,
                amount,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc1155BatchWithdrawal {
                token,
                token_ids,
                amounts,
                extra,
            } => Erc1155BatchWithdrawal {
                token,
                token_ids,
                amounts,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::EtherTransfer {
                receiver,
                amount,
                extra,
            } => EtherTransfer {
                receiver,
                amount,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc20Transfer {
                token,
                receiver,
                amount,
                extra,
            } => Erc20Transfer {
                token,
                receiver,
                amount,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc721Transfer {
                token,
                receiver,
                token_id,
                extra,
            } => Erc721Transfer {
                token,
                receiver,
                token_id,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc1155SingleTransfer {
                token,
                receiver,
                token_id,
                amount,
                extra,
            } => Erc1155SingleTransfer {
                token,
                receiver,
                token_id,
                amount,
                exec_layer_data: extra.bytes(),
            }
            .into(),
            Kind::Erc1155BatchTransfer {
                token,
                receiver,
                token_ids,
                amounts,
                extra,
            } => Erc1155BatchTransfer {
                token,
                receiver,
                token_ids,
                amounts,
                exec_layer_data: extra.bytes(),
            }
            .into(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let input = cli.kind.into_input();
    let payload = input.encode();
    debug!(input = input.name(), len = payload.len(), "payload encoded");

    println!("0x{}", hex::encode(&payload));
    if cli.json {
        println!("{}", serde_json::to_string(&input)?);
    }
    Ok(())
}
