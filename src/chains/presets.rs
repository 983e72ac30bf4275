//! Built-in chain descriptors.
//!
//! Metadata mirrors each network's public registration: ids, RPC endpoints
//! and explorer URLs are carried verbatim.

use super::{
    BlockExplorer, BlockExplorerMap, ChainDescriptor, NativeCurrency, RpcEndpoints, RpcUrlMap,
};

/// Base Mainnet (OP-stack L2), chain id 8453.
pub fn base() -> ChainDescriptor {
    let endpoints = RpcEndpoints {
        http: vec!["https://mainnet.base.org".to_string()],
        web_socket: vec![],
    };
    let basescan = BlockExplorer {
        name: "BaseScan".to_string(),
        url: "https://basescan.org".to_string(),
    };

    ChainDescriptor {
        id: 8453,
        network: "base-mainnet".to_string(),
        name: "Base Mainnet".to_string(),
        native_currency: NativeCurrency {
            name: "Base Mainnet".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        },
        rpc_urls: RpcUrlMap {
            default: endpoints.clone(),
            public: Some(endpoints),
        },
        block_explorers: Some(BlockExplorerMap {
            default: basescan.clone(),
            etherscan: Some(basescan),
        }),
    }
}

/// Linea (zkEVM L2), chain id 59144.
pub fn linea() -> ChainDescriptor {
    let endpoints = RpcEndpoints {
        http: vec!["https://rpc.linea.build".to_string()],
        web_socket: vec!["wss://rpc.linea.build".to_string()],
    };

    ChainDescriptor {
        id: 59_144,
        network: "linea".to_string(),
        name: "Linea".to_string(),
        native_currency: NativeCurrency {
            name: "Linea Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        },
        rpc_urls: RpcUrlMap {
            default: endpoints.clone(),
            public: Some(endpoints),
        },
        block_explorers: Some(BlockExplorerMap {
            default: BlockExplorer {
                name: "BlockScout".to_string(),
                url: "https://explorer.goerli.linea.build".to_string(),
            },
            etherscan: Some(BlockExplorer {
                name: "LineaScan".to_string(),
                url: "https://lineascan.build".to_string(),
            }),
        }),
    }
}

/// Every built-in descriptor, in registration order.
pub fn all() -> Vec<ChainDescriptor> {
    vec![base(), linea()]
}
