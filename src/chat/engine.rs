//! Message exchange engine
//!
//! At most one exchange is in flight. The user's turn is appended before
//! the network call starts; the assistant's turn is appended when the reply
//! arrives. A failed exchange is logged and the user's turn stays.

use super::transcript::{Transcript, Turn};
use crate::api::{ApiClient, Transport};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The single outstanding request, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    pub user_turn_content: String,
}

/// Read-only view of the chat for presentation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub transcript: Transcript,
    pub pending: Option<PendingExchange>,
    /// Text typed but not yet sent
    pub input: String,
}

impl ChatSnapshot {
    /// A reply is being awaited
    pub fn is_awaiting(&self) -> bool {
        self.pending.is_some()
    }
}

/// Why a send was a no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Empty or whitespace-only content
    EmptyMessage,
    ExchangeInFlight,
}

#[derive(Debug)]
pub enum SendOutcome {
    /// The exchange runs on its own task; dropping the handle detaches it
    Accepted(JoinHandle<()>),
    Ignored(IgnoreReason),
}

impl SendOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SendOutcome::Accepted(_))
    }

    /// Wait until an accepted exchange has been processed
    pub async fn settled(self) {
        if let SendOutcome::Accepted(handle) = self {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Chat exchange task aborted");
            }
        }
    }
}

/// Owns the transcript for as long as the chat view is mounted
pub struct ChatEngine<T> {
    api: Arc<ApiClient<T>>,
    snapshot_tx: watch::Sender<ChatSnapshot>,
}

impl<T: Transport + 'static> ChatEngine<T> {
    pub fn new(api: Arc<ApiClient<T>>) -> Self {
        let (snapshot_tx, _rx) = watch::channel(ChatSnapshot::default());
        Self { api, snapshot_tx }
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn set_input(&self, value: impl Into<String>) {
        let value = value.into();
        self.snapshot_tx.send_if_modified(|snapshot| {
            if snapshot.input == value {
                return false;
            }
            snapshot.input = value;
            true
        });
    }

    /// Send whatever is in the input buffer
    pub fn submit(self: &Arc<Self>) -> SendOutcome {
        let input = self.snapshot_tx.borrow().input.clone();
        self.send(&input)
    }

    /// Accept a message if it is non-blank and nothing is in flight.
    ///
    /// The user turn and the pending exchange are recorded before this
    /// returns; the network call happens on a spawned task.
    pub fn send(self: &Arc<Self>, content: &str) -> SendOutcome {
        let content = content.trim();
        if content.is_empty() {
            tracing::debug!("Ignoring blank chat message");
            return SendOutcome::Ignored(IgnoreReason::EmptyMessage);
        }

        let mut accepted = false;
        self.snapshot_tx.send_if_modified(|snapshot| {
            if snapshot.pending.is_some() {
                return false;
            }
            snapshot.transcript.push(Turn::user(content));
            snapshot.input.clear();
            snapshot.pending = Some(PendingExchange {
                user_turn_content: content.to_string(),
            });
            accepted = true;
            true
        });

        if !accepted {
            tracing::debug!("Ignoring chat message while a reply is pending");
            return SendOutcome::Ignored(IgnoreReason::ExchangeInFlight);
        }

        let engine = Arc::clone(self);
        let message = content.to_string();
        SendOutcome::Accepted(tokio::spawn(async move {
            engine.deliver(message).await;
        }))
    }

    async fn deliver(&self, message: String) {
        let result = self.api.send_message(&message).await;

        self.snapshot_tx.send_modify(|snapshot| {
            match &result {
                Ok(reply) => snapshot.transcript.push(Turn::assistant(reply.response.clone())),
                // Observability only: the transcript keeps the user's turn
                Err(e) => tracing::error!(
                    kind = e.kind.as_str(),
                    status = ?e.status,
                    error = %e.message,
                    "Chat exchange failed"
                ),
            }
            snapshot.pending = None;
        });
    }
}
