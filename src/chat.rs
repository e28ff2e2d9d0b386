//! Conversational exchange with the chat backend

mod engine;
mod transcript;

pub use engine::{ChatEngine, ChatSnapshot, IgnoreReason, PendingExchange, SendOutcome};
pub use transcript::{Role, Transcript, Turn};
