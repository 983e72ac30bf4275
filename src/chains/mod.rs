//! Chain Registry
//!
//! Static descriptors for the EVM networks a connector may operate on.
//! Descriptors are inert configuration data: built once at load time, never
//! mutated, and shared freely across any number of connector instances.

use serde::{Deserialize, Serialize};

pub mod presets;

/// Native currency metadata for a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// RPC endpoint URLs for one usage role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcEndpoints {
    /// HTTP endpoints
    pub http: Vec<String>,
    /// Streaming endpoints, if the network offers any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub web_socket: Vec<String>,
}

/// RPC URL sets keyed by usage role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcUrlMap {
    pub default: RpcEndpoints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<RpcEndpoints>,
}

/// A single block explorer entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockExplorer {
    pub name: String,
    pub url: String,
}

/// Block explorer URLs keyed by vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockExplorerMap {
    pub default: BlockExplorer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etherscan: Option<BlockExplorer>,
}

/// Immutable descriptor for one EVM network.
///
/// `id` is the unique join key across the system: session state, provider
/// acquisition and chain switching all refer to chains by this number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    /// Numeric chain id
    pub id: u64,
    /// Network slug (e.g. "base-mainnet")
    pub network: String,
    /// Human-readable name
    pub name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: RpcUrlMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_explorers: Option<BlockExplorerMap>,
}

/// Ordered, read-only collection of chain descriptors.
///
/// Order is preserved from construction; connectors treat the first entry as
/// the fallback default chain. An empty registry is representable here but
/// rejected at connector construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRegistry {
    chains: Vec<ChainDescriptor>,
}

impl ChainRegistry {
    pub fn new(chains: Vec<ChainDescriptor>) -> Self {
        Self { chains }
    }

    /// Look a descriptor up by chain id.
    pub fn get(&self, id: u64) -> Option<&ChainDescriptor> {
        self.chains.iter().find(|chain| chain.id == id)
    }

    /// Whether `id` is part of the configured set.
    pub fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    /// First configured descriptor, in construction order.
    pub fn first(&self) -> Option<&ChainDescriptor> {
        self.chains.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.chains.iter()
    }

    /// Configured chain ids, in construction order.
    pub fn ids(&self) -> Vec<u64> {
        self.chains.iter().map(|chain| chain.id).collect()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
