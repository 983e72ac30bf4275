//! Provider and signer surface.
//!
//! The connector acquires opaque transport handles from the host and calls
//! through them without interpreting results. Transport implementations live
//! with the host; only the call surface is defined here.

use std::sync::Arc;

use async_trait::async_trait;
use ethers_core::types::Address;
use serde::Serialize;
use serde_json::Value;

use super::error::ConnectorError;

/// Opaque RPC transport handle for one chain.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Derive a signing handle for the session.
    async fn get_signer(&self) -> Result<SignerHandle, ConnectorError>;

    /// Forward a raw RPC request and hand the result back untouched.
    async fn send(&self, method: &str, params: Value) -> Result<Value, ConnectorError>;
}

/// Shared provider handle.
pub type ProviderHandle = Arc<dyn Provider>;

/// Opaque signing handle derived from a provider.
pub trait Signer: std::fmt::Debug + Send + Sync {
    /// Account this signer acts for.
    fn address(&self) -> Address;
}

/// Shared signer handle.
pub type SignerHandle = Arc<dyn Signer>;

/// Host capability that yields a provider for a chain id, or nothing when no
/// usable transport exists for it.
pub type GetProvider = Arc<dyn Fn(u64) -> Option<ProviderHandle> + Send + Sync>;

/// Parameters for registering a token with the wallet surface behind the
/// provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchAssetParams {
    /// Token contract address
    pub address: Address,
    /// Decimal precision, 18 when unspecified
    pub decimals: u8,
    /// Optional icon URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Token symbol
    pub symbol: String,
}

impl WatchAssetParams {
    pub fn new(address: Address, symbol: &str) -> Self {
        Self {
            address,
            decimals: 18,
            image: None,
            symbol: symbol.to_string(),
        }
    }

    /// Override the default 18-decimal precision.
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Attach an icon URL.
    pub fn with_image(mut self, image: &str) -> Self {
        self.image = Some(image.to_string());
        self
    }
}
