use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use portal_cli::{process, Dispatcher, Finish, PortalConfig, Request};
use portal_codec::{decode_advance, Output};
use portal_ledger::Ledger;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portal", version, about = "Portal asset ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a JSON-lines request file against a fresh ledger
    Replay {
        requests: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overrides the application contract of the config file
        #[arg(long, value_parser = parse_address)]
        app_contract: Option<Address>,
        /// Print the final ledger snapshot after the last request
        #[arg(long)]
        snapshot: bool,
    },
    /// Decode an advance payload and print it as JSON
    Decode {
        #[arg(long, value_parser = parse_address)]
        sender: Address,
        payload: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

//==================== helpers ====================//

fn parse_address(value: &str) -> Result<Address, String> {
    value.parse().map_err(|e| format!("{e}"))
}

fn hex_decode(value: &str) -> Result<Vec<u8>> {
    let value = value.trim();
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits).with_context(|| format!("invalid hex payload {value:?}"))
}

fn load_config(path: Option<&Path>) -> Result<PortalConfig> {
    match path {
        Some(path) => Ok(PortalConfig::load(path)?),
        None => Ok(PortalConfig::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

//==================== replay ====================//

#[derive(Serialize)]
struct ReplayLine<'a> {
    line: usize,
    status: Finish,
    outputs: &'a [Output],
    encoded: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

fn replay_cmd(
    requests: &Path,
    config: Option<&Path>,
    app_contract: Option<Address>,
    snapshot: bool,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(app_contract) = app_contract {
        config.app_contract = app_contract;
    }

    let ledger = Ledger::new();
    let dispatcher = Dispatcher::from_config(&ledger, &config)?;

    let file =
        File::open(requests).with_context(|| format!("open {}", requests.display()))?;
    let (mut accepted, mut rejected) = (0usize, 0usize);
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut request: Request = serde_json::from_str(&line)
            .with_context(|| format!("line {}: not a request", index + 1))?;
        if let Request::Advance(advance) = &mut request {
            if advance.metadata.app_contract == Address::ZERO {
                advance.metadata.app_contract = config.app_contract;
            }
        }

        let processed = process(&dispatcher, &request);
        match processed.status {
            Finish::Accept => accepted += 1,
            Finish::Reject => rejected += 1,
        }
        print_json(&ReplayLine {
            line: index + 1,
            status: processed.status,
            outputs: &processed.outputs,
            encoded: processed
                .outputs
                .iter()
                .map(|output| format!("0x{}", hex::encode(output.encode())))
                .collect(),
            error: processed.error.as_deref(),
        })?;
    }

    let state = ledger.snapshot();
    info!(
        accepted,
        rejected,
        assets = state.assets.len(),
        accounts = state.accounts.len(),
        "replay finished"
    );
    if snapshot {
        print_json(&state)?;
    }
    Ok(())
}

//==================== decode ====================//

fn decode_cmd(sender: Address, payload: &str, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let payload = hex_decode(payload)?;
    if payload.is_empty() {
        bail!("empty payload");
    }
    let input = decode_advance(&config.portals, &sender, &payload)?;
    print_json(&input)
}

//==================== main ====================//

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Replay {
            requests,
            config,
            app_contract,
            snapshot,
        } => replay_cmd(&requests, config.as_deref(), app_contract, snapshot),
        Command::Decode {
            sender,
            payload,
            config,
        } => decode_cmd(sender, &payload, config.as_deref()),
    }
}
