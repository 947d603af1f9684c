use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use escrow::config::DevnetConfig;
use escrow::devnet::Devnet;
use escrow::events::ContractEvent;
use types::numeric::Wei;

#[derive(Parser)]
#[command(
    name = "escrow-cli",
    version,
    about = "Run escrow ledger calls on a local development network"
)]
struct Cli {
    /// JSON devnet config; defaults to the local hardhat network
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deposit ether from the deployer account
    Deposit {
        #[arg(long, default_value_t = 1)]
        ether: u64,
    },
    /// Withdraw the deployer's balance (deposits first on the hardhat network)
    Withdraw {
        #[arg(long, default_value_t = 1)]
        ether: u64,
    },
    /// Send the given ether to each of accounts 1 and 2
    Transfer {
        #[arg(long, default_value_t = 1)]
        ether_each: u64,
    },
}

fn ether(whole: u64) -> anyhow::Result<Wei> {
    Wei::ether(u128::from(whole)).context("ether amount out of range")
}

fn print_event(event: &ContractEvent) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

/// Deploy a fresh ledger on the configured network and run one command
/// from the deployer account.
fn run(config: DevnetConfig, command: Command) -> anyhow::Result<(Devnet, ContractEvent)> {
    if !config.is_development_chain() {
        bail!(
            "network {} is not a development chain; only local networks are supported",
            config.network.name
        );
    }
    info!("Running on {} network", config.network.name);

    let on_hardhat = config.network.name == "hardhat";
    let mut devnet = Devnet::new(config)?;
    let deployer = devnet.deployer();
    info!(contract = %devnet.contract_id(), "Ledger deployed");

    let event = match command {
        Command::Deposit { ether: amount } => {
            let event = devnet.deposit(deployer, ether(amount)?)?;
            info!("Funds deposited");
            event
        }
        Command::Withdraw { ether: amount } => {
            if on_hardhat {
                devnet.deposit(deployer, ether(amount)?)?;
            }
            let event = devnet.withdraw(deployer)?;
            info!("Funds withdrawn");
            event
        }
        Command::Transfer { ether_each } => {
            let first = devnet.account(1).context("transfer needs at least 3 accounts")?;
            let second = devnet.account(2).context("transfer needs at least 3 accounts")?;
            let each = ether(ether_each)?;
            let attached = each.checked_add(each).context("attached value out of range")?;

            let event = devnet.transfer(deployer, &[first, second], &[each, each], attached)?;
            info!("Funds transferred");
            info!(
                account = %first,
                balance = %devnet.wallet_balance(&first),
                "Recipient 1 balance"
            );
            info!(
                account = %second,
                balance = %devnet.wallet_balance(&second),
                "Recipient 2 balance"
            );
            event
        }
    };

    Ok((devnet, event))
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => DevnetConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => DevnetConfig::default(),
    };

    let (_, event) = run(config, cli.command)?;
    print_event(&event)
}
