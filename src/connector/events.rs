//! Change-notification events.
//!
//! Connectors fan session changes out to any number of subscribers. Emission
//! is synchronous: the event is pushed into every live subscriber channel in
//! registration order, and subscribers whose stream was dropped are pruned
//! on the way through.

use std::pin::Pin;
use std::sync::Mutex;

use ethers_core::types::Address;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// Chain portion of a change event and of a connect session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStatus {
    /// Active chain id
    pub id: u64,
    /// True when the id is outside the connector's configured set
    pub unsupported: bool,
}

/// Status tag carried by [`ConnectorEvent::Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// The connect handshake has started
    Connecting,
}

/// Events emitted by a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorEvent {
    /// Out-of-band status message
    Message { kind: MessageKind },
    /// Session state changed
    Change {
        chain: Option<ChainStatus>,
        account: Option<Address>,
    },
    /// The underlying provider/transport terminated the session
    Disconnect,
}

/// Stream of connector events, one per subscriber.
pub type EventStream = Pin<Box<dyn Stream<Item = ConnectorEvent> + Send>>;

/// Synchronous listener-list emitter.
pub struct EventEmitter {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ConnectorEvent>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register a subscriber and return its event stream.
    ///
    /// The stream yields events in emission order and ends when the emitter
    /// is dropped.
    pub fn subscribe(&self) -> EventStream {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.lock().push(tx);

        Box::pin(async_stream::stream! {
            while let Some(event) = rx.recv().await {
                yield event;
            }
        })
    }

    /// Push an event to every live subscriber.
    pub fn emit(&self, event: ConnectorEvent) {
        debug!(?event, "emit");
        self.lock().retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::UnboundedSender<ConnectorEvent>>> {
        // a panicked subscriber list is still a usable subscriber list
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}
