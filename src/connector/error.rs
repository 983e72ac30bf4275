//! Connector error types.
//!
//! Every failure is surfaced at the point of detection; the connector never
//! retries or reconnects on its own. Recovery is the host's responsibility.

use thiserror::Error;

/// Errors raised by wallet connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Construction was attempted with an empty chain set.
    #[error("no chains configured")]
    NoChainsConfigured,

    /// A default or target chain id is outside the configured set.
    #[error("chain {chain_id} is not configured for connector \"{connector_id}\"")]
    ChainNotConfigured {
        chain_id: u64,
        connector_id: &'static str,
    },

    /// The provider capability yielded no usable handle.
    #[error("connector provider not found")]
    ProviderNotFound,

    /// Interactive prompting is not available in this environment.
    #[error("prompt unavailable, supply an account resolver: {source}")]
    PromptUnavailable {
        #[source]
        source: std::io::Error,
    },

    /// Operator input did not parse as a chain address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// An account query was made while disconnected.
    #[error("no account connected")]
    NotConnected,

    /// Failure surfaced by the provider or signer surface, passed through.
    #[error("provider error: {0}")]
    Provider(String),
}
