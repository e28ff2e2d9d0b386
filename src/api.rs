//! Transport layer for the remote service
//!
//! Every call goes through a [`Transport`], which normalizes success and
//! failure into `Result<Value, TransportError>`. The session credential is
//! never handled here: the transport binding attaches it implicitly.

mod error;
mod http;
mod types;

pub use error::{TransportError, TransportErrorKind, NETWORK_FAILURE_MESSAGE};
pub use http::HttpTransport;
pub use types::{ChatReply, ChatRequest, Credentials, ErrorBody, Registration, User};

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use types::UserPayload;

/// Endpoints of the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Signup,
    Logout,
    Me,
    Chat,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Login => "/login",
            Endpoint::Signup => "/signup",
            Endpoint::Logout => "/logout",
            Endpoint::Me => "/me",
            Endpoint::Chat => "/chat",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::Me => Method::GET,
            Endpoint::Login | Endpoint::Signup | Endpoint::Logout | Endpoint::Chat => Method::POST,
        }
    }
}

/// Uniform call into the remote service
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a request; a successful empty body yields `Value::Null`.
    ///
    /// No retries: every failure is returned to the caller immediately.
    async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Value, TransportError> {
        (**self).call(endpoint, body).await
    }
}

/// Logging wrapper for transports
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: Transport> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: Transport> Transport for LoggingTransport<T> {
    async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Value, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.call(endpoint, body).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::info!(
                    endpoint = endpoint.path(),
                    duration_ms = %duration.as_millis(),
                    "Request completed"
                );
            }
            // A 401 from /me is the normal "not logged in" answer
            Err(e) if endpoint == Endpoint::Me && e.is_unauthenticated() => {
                tracing::debug!(
                    endpoint = endpoint.path(),
                    duration_ms = %duration.as_millis(),
                    "No active session"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = endpoint.path(),
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    status = ?e.status,
                    error = %e.message,
                    "Request failed"
                );
            }
        }

        result
    }
}

/// Typed operations over a [`Transport`]
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, TransportError> {
        let body = self
            .transport
            .call(Endpoint::Login, Some(encode(credentials)?))
            .await?;
        decode::<UserPayload>(body).map(UserPayload::into_user)
    }

    pub async fn signup(&self, registration: &Registration) -> Result<User, TransportError> {
        let body = self
            .transport
            .call(Endpoint::Signup, Some(encode(registration)?))
            .await?;
        decode::<UserPayload>(body).map(UserPayload::into_user)
    }

    pub async fn logout(&self) -> Result<(), TransportError> {
        self.transport.call(Endpoint::Logout, None).await?;
        Ok(())
    }

    /// Who am I. `Ok(None)` when the service reports no session (401).
    pub async fn current_user(&self) -> Result<Option<User>, TransportError> {
        match self.transport.call(Endpoint::Me, None).await {
            Ok(body) => decode::<User>(body).map(Some),
            Err(e) if e.is_unauthenticated() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn send_message(&self, message: &str) -> Result<ChatReply, TransportError> {
        let body = self
            .transport
            .call(Endpoint::Chat, Some(encode(&ChatRequest { message })?))
            .await?;
        decode(body)
    }
}

fn encode<B: serde::Serialize>(body: &B) -> Result<Value, TransportError> {
    serde_json::to_value(body).map_err(|e| {
        tracing::error!(error = %e, "Failed to encode request body");
        TransportError::decode()
    })
}

fn decode<R: DeserializeOwned>(body: Value) -> Result<R, TransportError> {
    serde_json::from_value(body).map_err(|e| {
        tracing::debug!(error = %e, "Response body did not match the expected shape");
        TransportError::decode()
    })
}
