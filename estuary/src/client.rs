//! Entry point tying configuration, transport and dispatch together

use crate::config::ClientConfig;
use crate::dispatch::{Dispatcher, OnFailure, OnSuccess};
use crate::documents::DocumentsClient;
use crate::error::{Error, Result};
use crate::indices::IndicesClient;
use crate::transport::{HttpTransport, Method, Transport};
use serde_json::Value;
use std::sync::Arc;

/// Client for one search service
///
/// Cheap to clone; clones share the transport and dispatcher.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
}

impl Client {
    /// HTTP client for the service described by `config`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        tracing::info!(url = %transport.base_url(), "search client ready");
        Self::with_transport(Arc::new(transport))
    }

    /// Client over any transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            transport,
            dispatcher: Dispatcher::new()?,
        })
    }

    pub fn with_dispatcher(transport: Arc<dyn Transport>, dispatcher: Dispatcher) -> Self {
        Self {
            transport,
            dispatcher,
        }
    }

    pub fn indices(&self) -> IndicesClient {
        IndicesClient::new(self.transport.clone(), self.dispatcher.clone())
    }

    pub fn documents(&self) -> DocumentsClient {
        DocumentsClient::new(self.transport.clone(), self.dispatcher.clone())
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Raw request through the transport
    pub async fn send(&self, path: &str, method: Method, body: Option<Value>) -> Result<Value> {
        self.transport.send(path, method, body).await
    }

    /// Continuation form of [`Client::send`]
    pub fn send_with<S, E>(
        &self,
        path: &str,
        method: Method,
        body: Option<Value>,
        on_success: S,
        on_failure: E,
    ) where
        S: FnOnce(Value) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        let transport = self.transport.clone();
        let path = path.to_string();
        self.dispatcher.spawn(
            async move { transport.send(&path, method, body).await },
            on_success,
            on_failure,
        );
    }

    /// Blocking form of [`Client::send`]
    pub fn send_blocking(&self, path: &str, method: Method, body: Option<Value>) -> Result<Value> {
        Dispatcher::wait(|ok: OnSuccess<_>, err: OnFailure| {
            self.send_with(path, method, body, ok, err)
        })
    }
}
