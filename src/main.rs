//! impersonator - drive an impersonated wallet session from the terminal
//!
//! Sessions run against a loopback provider, so no live RPC endpoint is
//! needed to inspect what a host application would see.

use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use ethers_core::utils::to_checksum;
use serde_json::Value;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use impersonator_connector::chains::presets;
use impersonator_connector::connector::resolver::parse_address;
use impersonator_connector::connector::{Provider, ProviderHandle, SignerHandle};
use impersonator_connector::{
    ConnectorError, ImpersonatorConnector, ImpersonatorOptions, WalletConnector,
};

/// impersonator: act as any on-chain address, no key required
#[derive(Parser)]
#[command(name = "impersonator")]
#[command(about = "Drive an impersonated wallet session", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in chain descriptors
    ListChains,

    /// Connect an impersonated session and print it
    Connect {
        /// Chain id to connect on (defaults to the first configured chain)
        #[arg(short, long)]
        chain_id: Option<u64>,

        /// Address to impersonate; prompts interactively when omitted
        #[arg(short, long)]
        address: Option<String>,
    },
}

/// Provider that logs requests instead of talking to a network.
struct LoopbackProvider {
    chain_id: u64,
}

#[async_trait]
impl Provider for LoopbackProvider {
    async fn get_signer(&self) -> Result<SignerHandle, ConnectorError> {
        Err(ConnectorError::Provider(
            "loopback provider has no signer".to_string(),
        ))
    }

    async fn send(&self, method: &str, params: Value) -> Result<Value, ConnectorError> {
        info!(method, %params, chain_id = self.chain_id, "loopback request");
        Ok(Value::Null)
    }
}

#[tokio::main]
async fn main() -> Result<(), ConnectorError> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let cli = Cli::parse();

    match cli.command {
        Commands::ListChains => {
            list_chains();
            Ok(())
        }
        Commands::Connect { chain_id, address } => connect(chain_id, address).await,
    }
}

fn list_chains() {
    for chain in presets::all() {
        let explorer = chain
            .block_explorers
            .as_ref()
            .map(|map| map.default.url.as_str())
            .unwrap_or("-");
        println!(
            "{:>8}  {:<16} {:<16} {}  {}",
            chain.id,
            chain.network,
            chain.name,
            chain.rpc_urls.default.http[0],
            explorer
        );
    }
}

async fn connect(chain_id: Option<u64>, address: Option<String>) -> Result<(), ConnectorError> {
    let mut options =
        ImpersonatorOptions::new(|chain_id| {
            Some(Arc::new(LoopbackProvider { chain_id }) as ProviderHandle)
        });

    if let Some(raw) = address {
        let account = parse_address(&raw)?;
        options = options.with_impersonated_address(move || async move { Ok(account) });
    }

    let connector = ImpersonatorConnector::new(presets::all(), options)?;
    let session = connector.connect(chain_id).await?;

    println!("account: {}", to_checksum(&session.account, None));
    println!(
        "chain:   {} (unsupported: {})",
        session.chain.id, session.chain.unsupported
    );
    Ok(())
}
