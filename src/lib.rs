//! Helix client
//!
//! Tracks an authenticated session against the Helix service and exchanges
//! chat messages with its conversational backend. The session lifecycle is a
//! pure state machine (`session`), the chat flow keeps at most one exchange
//! in flight (`chat`), and both talk to the service through the
//! [`api::Transport`] seam.

pub mod api;
pub mod chat;
pub mod config;
pub mod forms;
pub mod navigation;
pub mod session;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, HttpTransport, LoggingTransport, Transport, TransportError, User};
pub use chat::ChatEngine;
pub use config::ClientConfig;
pub use navigation::{Route, RouteNavigator};
pub use session::{SessionSnapshot, SessionState, SessionStore};
