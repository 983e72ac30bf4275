//! Account resolution strategies.
//!
//! `connect` resolves the impersonated account through an injected strategy.
//! Hosts normally supply a callback; an interactive stdin prompt is the
//! fallback for operator-driven sessions. Exactly one resolution attempt is
//! made per connect call - retry policy belongs to the host.

use std::future::Future;
use std::io;

use async_trait::async_trait;
use ethers_core::types::Address;
use futures_util::future::BoxFuture;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::error;

use super::error::ConnectorError;

/// Strategy for resolving the account to impersonate.
#[async_trait]
pub trait ResolveAccount: Send + Sync {
    async fn resolve(&self) -> Result<Address, ConnectorError>;
}

/// Resolution through a host-supplied async callback.
///
/// The callback's result is used verbatim; no validation beyond what the
/// `Address` type already guarantees.
pub struct CallbackResolver {
    callback: Box<dyn Fn() -> BoxFuture<'static, Result<Address, ConnectorError>> + Send + Sync>,
}

impl CallbackResolver {
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Address, ConnectorError>> + Send + 'static,
    {
        Self {
            callback: Box::new(move || Box::pin(callback())),
        }
    }
}

#[async_trait]
impl ResolveAccount for CallbackResolver {
    async fn resolve(&self) -> Result<Address, ConnectorError> {
        (self.callback)().await
    }
}

/// Interactive fallback: solicit a single line of text on standard input.
///
/// A closed or unreadable stdin means the environment cannot prompt; that is
/// surfaced as [`ConnectorError::PromptUnavailable`] with the underlying IO
/// failure attached.
pub struct StdinPrompt {
    prompt: String,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self {
            prompt: "Enter an address to impersonate: ".to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = prompt.to_string();
        self
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResolveAccount for StdinPrompt {
    async fn resolve(&self) -> Result<Address, ConnectorError> {
        let mut stderr = tokio::io::stderr();
        if let Err(source) = stderr.write_all(self.prompt.as_bytes()).await {
            error!("prompt unavailable, supply an account resolver: {source}");
            return Err(ConnectorError::PromptUnavailable { source });
        }
        let _ = stderr.flush().await;

        let mut answer = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut answer).await {
            Ok(0) => {
                let source = io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed");
                error!("prompt unavailable, supply an account resolver: {source}");
                Err(ConnectorError::PromptUnavailable { source })
            }
            Ok(_) => parse_address(&answer),
            Err(source) => {
                error!("prompt unavailable, supply an account resolver: {source}");
                Err(ConnectorError::PromptUnavailable { source })
            }
        }
    }
}

/// Parse operator input into an address.
pub fn parse_address(input: &str) -> Result<Address, ConnectorError> {
    let trimmed = input.trim();
    trimmed
        .parse::<Address>()
        .map_err(|_| ConnectorError::InvalidAddress(trimmed.to_string()))
}
