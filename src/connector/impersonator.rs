//! Impersonator Connector
//!
//! Behaves like a wallet connector for an address whose key it never holds:
//! the account comes from the operator (injected callback or interactive
//! prompt) instead of a key store. The session is a two-state machine,
//! Disconnected (initial, no account) and Connected, with `connect` and
//! `disconnect` as the only transitions.
//!
//! One logical session per instance. `connect` suspends at provider
//! acquisition and account resolution without holding any lock, so two
//! connect calls racing on the same instance settle on whichever one writes
//! its account last; callers that care must serialize connects themselves.

use std::sync::Arc;

use async_trait::async_trait;
use ethers_core::types::Address;
use ethers_core::utils::to_checksum;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::chains::{ChainDescriptor, ChainRegistry};

use super::error::ConnectorError;
use super::events::{ChainStatus, ConnectorEvent, EventEmitter, EventStream, MessageKind};
use super::provider::{GetProvider, ProviderHandle, SignerHandle, WatchAssetParams};
use super::resolver::{CallbackResolver, ResolveAccount, StdinPrompt};
use super::{ConnectSession, WalletConnector};

/// Identity token carried by configuration errors.
pub const CONNECTOR_ID: &str = "impersonator";

/// Behavior options supplied at construction.
pub struct ImpersonatorOptions {
    /// Capability yielding a provider handle for a chain id
    pub get_provider: GetProvider,
    /// Account resolution strategy; the interactive prompt when absent
    pub resolver: Option<Arc<dyn ResolveAccount>>,
    /// Chain to start on; the first configured chain when absent
    pub default_chain_id: Option<u64>,
}

impl ImpersonatorOptions {
    pub fn new<F>(get_provider: F) -> Self
    where
        F: Fn(u64) -> Option<ProviderHandle> + Send + Sync + 'static,
    {
        Self {
            get_provider: Arc::new(get_provider),
            resolver: None,
            default_chain_id: None,
        }
    }

    /// Resolve the impersonated address through `callback` instead of
    /// prompting the operator.
    pub fn with_impersonated_address<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Address, ConnectorError>> + Send + 'static,
    {
        self.resolver = Some(Arc::new(CallbackResolver::new(callback)));
        self
    }

    /// Inject a custom resolution strategy.
    pub fn with_resolver(mut self, resolver: Arc<dyn ResolveAccount>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Start on `chain_id` instead of the first configured chain.
    pub fn with_default_chain_id(mut self, chain_id: u64) -> Self {
        self.default_chain_id = Some(chain_id);
        self
    }
}

/// Mutable session state, scoped to the connector instance.
#[derive(Debug, Clone, Copy)]
struct SessionState {
    chain_id: u64,
    account: Option<Address>,
}

/// Connector that impersonates an operator-chosen address.
pub struct ImpersonatorConnector {
    chains: ChainRegistry,
    get_provider: GetProvider,
    resolver: Arc<dyn ResolveAccount>,
    default_chain_id: u64,
    state: RwLock<SessionState>,
    events: EventEmitter,
}

impl std::fmt::Debug for ImpersonatorConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpersonatorConnector")
            .field("chains", &self.chains)
            .field("default_chain_id", &self.default_chain_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ImpersonatorConnector {
    /// Build a connector over `chains`.
    ///
    /// Fails when `chains` is empty, or when `default_chain_id` names a
    /// chain outside of it. The account is untouched: a new connector is
    /// always Disconnected.
    pub fn new(
        chains: Vec<ChainDescriptor>,
        options: ImpersonatorOptions,
    ) -> Result<Self, ConnectorError> {
        let chains = ChainRegistry::new(chains);
        let fallback = chains
            .first()
            .map(|chain| chain.id)
            .ok_or(ConnectorError::NoChainsConfigured)?;

        if let Some(chain_id) = options.default_chain_id {
            if !chains.contains(chain_id) {
                return Err(ConnectorError::ChainNotConfigured {
                    chain_id,
                    connector_id: CONNECTOR_ID,
                });
            }
        }
        let default_chain_id = options.default_chain_id.unwrap_or(fallback);

        Ok(Self {
            chains,
            get_provider: options.get_provider,
            resolver: options
                .resolver
                .unwrap_or_else(|| Arc::new(StdinPrompt::new())),
            default_chain_id,
            state: RwLock::new(SessionState {
                chain_id: default_chain_id,
                account: None,
            }),
            events: EventEmitter::new(),
        })
    }

    fn is_chain_unsupported(&self, chain_id: u64) -> bool {
        !self.chains.contains(chain_id)
    }

    fn provider_for(&self, chain_id: u64) -> Result<ProviderHandle, ConnectorError> {
        (self.get_provider)(chain_id).ok_or(ConnectorError::ProviderNotFound)
    }

    // Provider-signal hooks. An impersonated session has no external wallet
    // emitting spontaneous account or chain changes, so the first two are
    // deliberately inert.

    /// External account change: not applicable.
    pub fn on_accounts_changed(&self) {}

    /// External chain change: not applicable.
    pub fn on_chain_changed(&self) {}

    /// The underlying provider/transport terminated the session.
    pub fn on_disconnect(&self) {
        self.events.emit(ConnectorEvent::Disconnect);
    }
}

#[async_trait]
impl WalletConnector for ImpersonatorConnector {
    fn id(&self) -> &'static str {
        CONNECTOR_ID
    }

    fn name(&self) -> &'static str {
        "Impersonator"
    }

    fn ready(&self) -> bool {
        true
    }

    async fn connect(&self, chain_id: Option<u64>) -> Result<ConnectSession, ConnectorError> {
        let active = self.state.read().await.chain_id;
        self.provider_for(chain_id.unwrap_or(active))?;

        // announce the handshake before the account is known
        self.events.emit(ConnectorEvent::Message {
            kind: MessageKind::Connecting,
        });

        // switch first so the returned session reflects the requested chain;
        // an unconfigured target fails here, before any resolution runs
        if let Some(requested) = chain_id {
            self.switch_chain(requested).await?;
        }

        let account = self.resolver.resolve().await?;
        self.state.write().await.account = Some(account);

        let current = self.state.read().await.chain_id;
        info!(
            account = %to_checksum(&account, None),
            chain_id = current,
            "session established"
        );

        Ok(ConnectSession {
            account,
            chain: ChainStatus {
                id: current,
                unsupported: self.is_chain_unsupported(current),
            },
            provider: self.provider_for(current)?,
        })
    }

    async fn disconnect(&self) -> Result<(), ConnectorError> {
        let mut state = self.state.write().await;
        state.account = None;
        state.chain_id = self.default_chain_id;
        debug!("session cleared");
        Ok(())
    }

    async fn get_account(&self) -> Result<Address, ConnectorError> {
        self.state
            .read()
            .await
            .account
            .ok_or(ConnectorError::NotConnected)
    }

    async fn get_chain_id(&self) -> u64 {
        self.state.read().await.chain_id
    }

    async fn get_provider(
        &self,
        chain_id: Option<u64>,
    ) -> Result<ProviderHandle, ConnectorError> {
        let chain_id = match chain_id {
            Some(id) => id,
            None => self.state.read().await.chain_id,
        };
        self.provider_for(chain_id)
    }

    async fn get_signer(&self, chain_id: u64) -> Result<SignerHandle, ConnectorError> {
        self.provider_for(chain_id)?.get_signer().await
    }

    async fn is_authorized(&self) -> bool {
        self.state.read().await.account.is_some()
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<ChainDescriptor, ConnectorError> {
        let chain = self
            .chains
            .get(chain_id)
            .cloned()
            .ok_or(ConnectorError::ChainNotConfigured {
                chain_id,
                connector_id: CONNECTOR_ID,
            })?;

        self.state.write().await.chain_id = chain_id;
        debug!(chain_id, network = %chain.network, "switched chain");

        // the id was found in the configured set, so never unsupported here
        self.events.emit(ConnectorEvent::Change {
            chain: Some(ChainStatus {
                id: chain_id,
                unsupported: false,
            }),
            account: None,
        });

        Ok(chain)
    }

    async fn watch_asset(
        &self,
        params: WatchAssetParams,
    ) -> Result<serde_json::Value, ConnectorError> {
        let provider = self.get_provider(None).await?;
        provider
            .send(
                "wallet_watchAsset",
                json!([{ "type": "ERC20", "options": params }]),
            )
            .await
    }

    fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::presets;
    use crate::connector::provider::{Provider, Signer};
    use futures_util::StreamExt;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider that records every forwarded request.
    struct RecordingProvider {
        calls: Arc<Mutex<Vec<(String, Value)>>>,
    }

    #[derive(Debug)]
    struct StubSigner {
        address: Address,
    }

    impl Signer for StubSigner {
        fn address(&self) -> Address {
            self.address
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        async fn get_signer(&self) -> Result<SignerHandle, ConnectorError> {
            Ok(Arc::new(StubSigner {
                address: test_address(),
            }))
        }

        async fn send(&self, method: &str, params: Value) -> Result<Value, ConnectorError> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params));
            Ok(json!(true))
        }
    }

    /// Provider whose signer surface always fails.
    struct NoSignerProvider;

    #[async_trait]
    impl Provider for NoSignerProvider {
        async fn get_signer(&self) -> Result<SignerHandle, ConnectorError> {
            Err(ConnectorError::Provider("signer derivation failed".to_string()))
        }

        async fn send(&self, _method: &str, _params: Value) -> Result<Value, ConnectorError> {
            Ok(Value::Null)
        }
    }

    /// Resolver that counts how often it ran.
    struct CountingResolver {
        address: Address,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ResolveAccount for CountingResolver {
        async fn resolve(&self) -> Result<Address, ConnectorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.address)
        }
    }

    /// Resolver simulating an environment where prompting is impossible.
    struct UnavailablePrompt;

    #[async_trait]
    impl ResolveAccount for UnavailablePrompt {
        async fn resolve(&self) -> Result<Address, ConnectorError> {
            Err(ConnectorError::PromptUnavailable {
                source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stdin closed"),
            })
        }
    }

    fn test_address() -> Address {
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
            .parse()
            .unwrap()
    }

    fn recording_options() -> (ImpersonatorOptions, Arc<Mutex<Vec<(String, Value)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&calls);
        let options = ImpersonatorOptions::new(move |_chain_id| {
            Some(Arc::new(RecordingProvider {
                calls: Arc::clone(&recorded),
            }) as ProviderHandle)
        });
        (options, calls)
    }

    fn connector(chains: Vec<ChainDescriptor>) -> ImpersonatorConnector {
        let (options, _) = recording_options();
        let address = test_address();
        ImpersonatorConnector::new(
            chains,
            options.with_impersonated_address(move || async move { Ok(address) }),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_chain_set_is_a_configuration_error() {
        let (options, _) = recording_options();
        let err = ImpersonatorConnector::new(vec![], options).unwrap_err();

        assert!(matches!(err, ConnectorError::NoChainsConfigured));
    }

    #[test]
    fn test_foreign_default_chain_is_a_configuration_error() {
        let (options, _) = recording_options();
        let err = ImpersonatorConnector::new(
            vec![presets::base()],
            options.with_default_chain_id(59144),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ConnectorError::ChainNotConfigured {
                chain_id: 59144,
                connector_id: CONNECTOR_ID,
            }
        ));
    }

    #[tokio::test]
    async fn test_default_chain_falls_back_to_the_first_entry() {
        let connector = connector(vec![presets::base(), presets::linea()]);

        assert_eq!(connector.get_chain_id().await, 8453);
    }

    #[tokio::test]
    async fn test_explicit_default_chain_is_honored() {
        let (options, _) = recording_options();
        let connector = ImpersonatorConnector::new(
            vec![presets::base(), presets::linea()],
            options.with_default_chain_id(59144),
        )
        .unwrap();

        assert_eq!(connector.get_chain_id().await, 59144);
    }

    #[tokio::test]
    async fn test_switch_chain_succeeds_for_every_configured_id() {
        let connector = connector(vec![presets::base(), presets::linea()]);
        let events = connector.subscribe();
        let ids = [8453, 59144, 8453];

        for id in ids {
            let descriptor = connector.switch_chain(id).await.unwrap();

            assert_eq!(descriptor.id, id);
            assert_eq!(connector.get_chain_id().await, id);
        }

        // exactly one change notification per switch, in order
        drop(connector);
        let collected: Vec<ConnectorEvent> = events.collect().await;
        let expected: Vec<ConnectorEvent> = ids
            .iter()
            .map(|&id| ConnectorEvent::Change {
                chain: Some(ChainStatus {
                    id,
                    unsupported: false,
                }),
                account: None,
            })
            .collect();
        assert_eq!(collected, expected);
    }

    #[tokio::test]
    async fn test_switch_chain_to_unknown_id_fails_and_leaves_state() {
        let connector = connector(vec![presets::base()]);
        let events = connector.subscribe();

        let err = connector.switch_chain(59144).await.unwrap_err();

        assert!(matches!(
            err,
            ConnectorError::ChainNotConfigured { chain_id: 59144, .. }
        ));
        assert_eq!(connector.get_chain_id().await, 8453);

        drop(connector);
        assert!(events.collect::<Vec<_>>().await.is_empty());
    }

    #[tokio::test]
    async fn test_connect_without_chain_keeps_the_active_chain() {
        let connector = connector(vec![presets::base()]);

        let session = connector.connect(None).await.unwrap();

        assert_eq!(connector.get_chain_id().await, 8453);
        assert_eq!(session.chain, ChainStatus { id: 8453, unsupported: false });
        assert_eq!(session.account, test_address());
        assert_eq!(
            to_checksum(&session.account, None),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert_eq!(connector.get_account().await.unwrap(), test_address());
    }

    #[tokio::test]
    async fn test_connect_emits_connecting_then_change_when_switching() {
        let connector = connector(vec![presets::base(), presets::linea()]);
        let events = connector.subscribe();

        let session = connector.connect(Some(59144)).await.unwrap();
        assert_eq!(session.chain.id, 59144);

        drop(connector);
        let collected: Vec<ConnectorEvent> = events.collect().await;
        assert_eq!(
            collected,
            vec![
                ConnectorEvent::Message {
                    kind: MessageKind::Connecting
                },
                ConnectorEvent::Change {
                    chain: Some(ChainStatus {
                        id: 59144,
                        unsupported: false
                    }),
                    account: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_connect_to_unconfigured_chain_fails_before_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (options, _) = recording_options();
        let connector = ImpersonatorConnector::new(
            vec![presets::base()],
            options.with_resolver(Arc::new(CountingResolver {
                address: test_address(),
                calls: Arc::clone(&calls),
            })),
        )
        .unwrap();

        let err = connector.connect(Some(59144)).await.unwrap_err();

        assert!(matches!(
            err,
            ConnectorError::ChainNotConfigured { chain_id: 59144, .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!connector.is_authorized().await);
        assert_eq!(connector.get_chain_id().await, 8453);
    }

    #[tokio::test]
    async fn test_connect_without_provider_fails_up_front() {
        let address = test_address();
        let options = ImpersonatorOptions::new(|_| None)
            .with_impersonated_address(move || async move { Ok(address) });
        let connector = ImpersonatorConnector::new(vec![presets::base()], options).unwrap();
        let events = connector.subscribe();

        let err = connector.connect(None).await.unwrap_err();

        assert!(matches!(err, ConnectorError::ProviderNotFound));
        assert!(!connector.is_authorized().await);

        // failing before the handshake announcement leaves the stream silent
        drop(connector);
        assert!(events.collect::<Vec<_>>().await.is_empty());
    }

    #[tokio::test]
    async fn test_prompt_unavailable_leaves_the_session_untouched() {
        let (options, _) = recording_options();
        let connector = ImpersonatorConnector::new(
            vec![presets::base()],
            options.with_resolver(Arc::new(UnavailablePrompt)),
        )
        .unwrap();

        let err = connector.connect(None).await.unwrap_err();

        assert!(matches!(err, ConnectorError::PromptUnavailable { .. }));
        assert!(!connector.is_authorized().await);
        assert_eq!(connector.get_chain_id().await, 8453);
    }

    #[tokio::test]
    async fn test_disconnect_resets_and_is_idempotent() {
        let connector = connector(vec![presets::base(), presets::linea()]);
        connector.connect(Some(59144)).await.unwrap();
        assert!(connector.is_authorized().await);

        connector.disconnect().await.unwrap();
        assert!(!connector.is_authorized().await);
        assert_eq!(connector.get_chain_id().await, 8453);

        // a second disconnect is equivalent to the first
        connector.disconnect().await.unwrap();
        assert!(!connector.is_authorized().await);
        assert_eq!(connector.get_chain_id().await, 8453);
    }

    #[tokio::test]
    async fn test_get_account_and_is_authorized_always_agree() {
        let connector = connector(vec![presets::base()]);

        assert!(matches!(
            connector.get_account().await.unwrap_err(),
            ConnectorError::NotConnected
        ));
        assert!(!connector.is_authorized().await);

        connector.connect(None).await.unwrap();
        assert!(connector.get_account().await.is_ok());
        assert!(connector.is_authorized().await);

        connector.disconnect().await.unwrap();
        assert!(matches!(
            connector.get_account().await.unwrap_err(),
            ConnectorError::NotConnected
        ));
        assert!(!connector.is_authorized().await);
    }

    #[tokio::test]
    async fn test_reconnect_replaces_the_session() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (options, _) = recording_options();
        let connector = ImpersonatorConnector::new(
            vec![presets::base(), presets::linea()],
            options.with_resolver(Arc::new(CountingResolver {
                address: test_address(),
                calls: Arc::clone(&calls),
            })),
        )
        .unwrap();

        connector.connect(None).await.unwrap();
        let session = connector.connect(Some(59144)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.chain.id, 59144);
        assert_eq!(connector.get_chain_id().await, 59144);
        assert!(connector.is_authorized().await);
    }

    #[tokio::test]
    async fn test_watch_asset_forwards_an_erc20_registration() {
        let (options, calls) = recording_options();
        let address = test_address();
        let connector = ImpersonatorConnector::new(
            vec![presets::base()],
            options.with_impersonated_address(move || async move { Ok(address) }),
        )
        .unwrap();

        let token: Address = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"
            .parse()
            .unwrap();
        let result = connector
            .watch_asset(WatchAssetParams::new(token, "USDC").with_decimals(6))
            .await
            .unwrap();
        assert_eq!(result, json!(true));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (method, params) = &calls[0];
        assert_eq!(method, "wallet_watchAsset");
        assert_eq!(params[0]["type"], "ERC20");
        assert_eq!(params[0]["options"]["symbol"], "USDC");
        assert_eq!(params[0]["options"]["decimals"], 6);
    }

    #[tokio::test]
    async fn test_watch_asset_without_provider_fails() {
        let connector = ImpersonatorConnector::new(
            vec![presets::base()],
            ImpersonatorOptions::new(|_| None),
        )
        .unwrap();

        let err = connector
            .watch_asset(WatchAssetParams::new(test_address(), "USDC"))
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectorError::ProviderNotFound));
    }

    #[tokio::test]
    async fn test_get_signer_passes_provider_results_through() {
        let connector = connector(vec![presets::base()]);

        let signer = connector.get_signer(8453).await.unwrap();
        assert_eq!(signer.address(), test_address());
    }

    #[tokio::test]
    async fn test_get_signer_passes_provider_failures_through() {
        let connector = ImpersonatorConnector::new(
            vec![presets::base()],
            ImpersonatorOptions::new(|_| Some(Arc::new(NoSignerProvider) as ProviderHandle)),
        )
        .unwrap();

        let err = connector.get_signer(8453).await.unwrap_err();
        assert!(matches!(err, ConnectorError::Provider(_)));
    }

    #[tokio::test]
    async fn test_on_disconnect_emits_the_disconnect_event() {
        let connector = connector(vec![presets::base()]);
        let events = connector.subscribe();

        connector.on_disconnect();
        connector.on_accounts_changed();
        connector.on_chain_changed();

        drop(connector);
        assert_eq!(
            events.collect::<Vec<_>>().await,
            vec![ConnectorEvent::Disconnect]
        );
    }
}
