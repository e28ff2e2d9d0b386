//! Session lifecycle state machine
//!
//! Implements the Elm Architecture pattern: a pure `transition` function
//! over [`SessionSnapshot`] produces effects, which [`SessionStore`]
//! executes against the transport and navigator.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;
mod store;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{AuthOperation, SessionSnapshot, SessionState};
pub use store::{SessionError, SessionStore};
pub use transition::{transition, TransitionError, TransitionResult};
