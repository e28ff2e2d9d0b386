//! Transport error types

use super::types::ErrorBody;
use thiserror::Error;

/// Message carried by every failure that never reached the service
pub const NETWORK_FAILURE_MESSAGE: &str = "Unable to reach the server";

/// Message carried when a 2xx body does not match the expected shape
pub const DECODE_FAILURE_MESSAGE: &str = "Unexpected response from server";

/// Transport failure with classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    /// HTTP status, when the service answered
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unauthenticated, message).with_status(401)
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Server, message).with_status(status)
    }

    pub fn network() -> Self {
        Self::new(TransportErrorKind::Network, NETWORK_FAILURE_MESSAGE)
    }

    pub fn decode() -> Self {
        Self::new(TransportErrorKind::Decode, DECODE_FAILURE_MESSAGE)
    }

    /// Classify a non-2xx response.
    ///
    /// The message is the structured `{error}` payload when the body carries
    /// one, otherwise a synthesized message embedding the status.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {status}"));

        if status == 401 {
            Self::unauthenticated(message)
        } else {
            Self::server(status, message)
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.kind == TransportErrorKind::Unauthenticated
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// 401 from the service; expected on `/me` without a session
    Unauthenticated,
    /// Any other non-2xx answer
    Server,
    /// The service could not be reached (connect, DNS, timeout)
    Network,
    /// 2xx answer with an unexpected body
    Decode,
}

impl TransportErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Server => "server",
            Self::Network => "network",
            Self::Decode => "decode",
        }
    }
}
