//! impersonator-connector
//!
//! Wallet connector that lets an application act as if an arbitrary on-chain
//! address were connected, without holding its private key. The hosting
//! application either injects a callback that resolves the address to
//! impersonate, or lets an interactive prompt ask the operator for one.
//!
//! The connector exposes the same lifecycle contract a real wallet connector
//! would - connect, disconnect, account and chain queries, provider and
//! signer acquisition, chain switching, asset registration, and a
//! change-notification stream - so impersonated sessions are drop-in for
//! preview and test tooling.

pub mod chains;
pub mod connector;

pub use chains::{ChainDescriptor, ChainRegistry};
pub use connector::{
    ChainStatus, ConnectSession, ConnectorError, ConnectorEvent, EventStream,
    ImpersonatorConnector, ImpersonatorOptions, WalletConnector, WatchAssetParams,
};
