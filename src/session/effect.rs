//! Effects produced by session transitions

use super::state::AuthOperation;
use crate::api::{Credentials, Registration};
use crate::navigation::Route;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the service who the current credential belongs to
    FetchCurrentUser,

    SubmitLogin { credentials: Credentials },

    SubmitSignup { registration: Registration },

    SubmitLogout,

    Navigate(Route),

    /// Record a failed transition on the observability sink
    ReportFailure {
        operation: AuthOperation,
        message: String,
    },
}

impl Effect {
    pub fn report(operation: AuthOperation, message: impl Into<String>) -> Self {
        Effect::ReportFailure {
            operation,
            message: message.into(),
        }
    }
}
