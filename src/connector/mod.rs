//! Wallet Connectors
//!
//! This module defines the contract between a hosting application and a
//! wallet connector. All connectors implement the `WalletConnector` trait,
//! providing a consistent API for:
//! - Session lifecycle (connect, disconnect, silent restore)
//! - Account and chain queries
//! - Provider and signer acquisition
//! - Chain switching and asset registration
//! - Change notifications via an event stream

pub mod error;
pub mod events;
pub mod impersonator;
pub mod provider;
pub mod resolver;

// Re-export commonly used items
pub use error::ConnectorError;
pub use events::{ChainStatus, ConnectorEvent, EventStream, MessageKind};
pub use impersonator::{ImpersonatorConnector, ImpersonatorOptions};
pub use provider::{GetProvider, Provider, ProviderHandle, Signer, SignerHandle, WatchAssetParams};
pub use resolver::{CallbackResolver, ResolveAccount, StdinPrompt};

use std::fmt;

use async_trait::async_trait;
use ethers_core::types::Address;

use crate::chains::ChainDescriptor;

/// Session descriptor returned by a successful connect.
#[derive(Clone)]
pub struct ConnectSession {
    /// The impersonated account
    pub account: Address,
    /// Active chain and whether it sits outside the configured set
    pub chain: ChainStatus,
    /// Provider handle for the active chain
    pub provider: ProviderHandle,
}

impl fmt::Debug for ConnectSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectSession")
            .field("account", &self.account)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

/// Capability interface every wallet connector exposes to its host.
///
/// Operations are asynchronous and fail with explicit [`ConnectorError`]
/// results, never silent defaults. The change-notification surface is
/// [`WalletConnector::subscribe`]; connectors own no base type.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Stable connector identity token.
    fn id(&self) -> &'static str;

    /// Human-readable connector name.
    fn name(&self) -> &'static str;

    /// Whether the connector can be used in this environment.
    fn ready(&self) -> bool;

    /// Establish a session, optionally switching to `chain_id` first.
    async fn connect(&self, chain_id: Option<u64>) -> Result<ConnectSession, ConnectorError>;

    /// Tear the session down. Always succeeds; a no-op when disconnected.
    async fn disconnect(&self) -> Result<(), ConnectorError>;

    /// Currently connected account.
    async fn get_account(&self) -> Result<Address, ConnectorError>;

    /// Currently active chain id.
    async fn get_chain_id(&self) -> u64;

    /// Provider handle for `chain_id`, or for the active chain when `None`.
    async fn get_provider(&self, chain_id: Option<u64>)
        -> Result<ProviderHandle, ConnectorError>;

    /// Signing handle derived from the provider for `chain_id`.
    async fn get_signer(&self, chain_id: u64) -> Result<SignerHandle, ConnectorError>;

    /// Whether a session can be restored without prompting the operator.
    async fn is_authorized(&self) -> bool;

    /// Make `chain_id` the active chain and return its descriptor.
    async fn switch_chain(&self, chain_id: u64) -> Result<ChainDescriptor, ConnectorError>;

    /// Register a token with the wallet surface behind the provider.
    async fn watch_asset(
        &self,
        params: WatchAssetParams,
    ) -> Result<serde_json::Value, ConnectorError>;

    /// Stream of change notifications for this connector.
    fn subscribe(&self) -> EventStream;
}
