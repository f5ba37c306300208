//! Transport adapter
//!
//! The rest of the crate only shapes paths and bodies; a [`Transport`]
//! performs the call and hands back the parsed JSON body.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace, warn};
use url::Url;

/// HTTP verbs used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Performs one request and returns the response body as JSON.
///
/// Implementations report network problems as [`Error::Transport`]. Error
/// bodies sent by the service are returned as ordinary JSON; interpreting
/// them is up to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, path: &str, method: Method, body: Option<Value>) -> Result<Value>;
}

/// [`Transport`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Transport(format!("bad server address: {}: {}", path, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, path: &str, method: Method, body: Option<Value>) -> Result<Value> {
        let url = self.url_for(path)?;
        debug!(%method, %path, "sending request");

        let mut request = self.client.request(method.into(), url);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let err = Error::from(e);
            warn!(%method, %path, error = %err, "request failed");
            err
        })?;

        let status = response.status();
        let text = response.text().await?;
        trace!(%method, %path, status = status.as_u16(), body = %text, "received response");

        serde_json::from_str(&text).map_err(|e| {
            Error::MalformedResponse(format!(
                "{} {} returned a non-JSON body (status {}): {}",
                method, path, status, e
            ))
        })
    }
}
