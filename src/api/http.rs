//! reqwest-backed transport
//!
//! The client keeps its own cookie store, which plays the role of the
//! browser's credentialed-request mode: the session cookie set by `/login`
//! or `/signup` is replayed on every later call without this code ever
//! reading or writing it.

use super::{Endpoint, Transport, TransportError};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

/// HTTP transport bound to one base origin
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            tracing::error!(error = %e, "Failed to create HTTP client");
            TransportError::network()
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn url_for(&self, endpoint: Endpoint) -> Result<Url, TransportError> {
        self.base_url
            .join(endpoint.path().trim_start_matches('/'))
            .map_err(|e| {
                tracing::error!(error = %e, endpoint = endpoint.path(), "Invalid endpoint URL");
                TransportError::network()
            })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Value, TransportError> {
        let url = self.url_for(endpoint)?;

        let mut request = self.client.request(endpoint.method(), url);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!(
                endpoint = endpoint.path(),
                error = %e,
                timeout = e.is_timeout(),
                connect = e.is_connect(),
                "Request did not reach the server"
            );
            TransportError::network()
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            tracing::debug!(endpoint = endpoint.path(), error = %e, "Failed to read response");
            TransportError::network()
        })?;

        if !status.is_success() {
            return Err(TransportError::from_status(status.as_u16(), &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::debug!(endpoint = endpoint.path(), error = %e, "Response is not JSON");
            TransportError::decode().with_status(status.as_u16())
        })
    }
}
