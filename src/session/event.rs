//! Events that drive the session state machine

use super::state::AuthOperation;
use crate::api::{Credentials, Registration, TransportError, User};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Requests from the presentation layer
    RecoveryRequested,
    LoginRequested {
        credentials: Credentials,
    },
    SignupRequested {
        registration: Registration,
    },
    LogoutRequested,

    // Completions from the transport
    /// `/me` answered; `None` means no session (401)
    RecoveryResolved {
        user: Option<User>,
    },
    RecoveryFailed {
        error: TransportError,
    },
    AuthSucceeded {
        operation: AuthOperation,
        user: User,
    },
    AuthFailed {
        operation: AuthOperation,
        error: TransportError,
    },
    LogoutCompleted,
    LogoutFailed {
        error: TransportError,
    },
}

impl Event {
    /// Operation a request event starts, if it is a request
    pub fn requested_operation(&self) -> Option<AuthOperation> {
        match self {
            Event::RecoveryRequested => Some(AuthOperation::Recovery),
            Event::LoginRequested { .. } => Some(AuthOperation::Login),
            Event::SignupRequested { .. } => Some(AuthOperation::Signup),
            Event::LogoutRequested => Some(AuthOperation::Logout),
            _ => None,
        }
    }
}
