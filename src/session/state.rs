//! Session state types

use crate::api::User;
use std::fmt;

/// Who the client believes is logged in
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Startup recovery has not resolved yet
    #[default]
    Unknown,
    /// No authenticated user
    Anonymous,
    Authenticated { user: User },
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated { user } => Some(user),
            SessionState::Unknown | SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Transition currently awaiting the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthOperation {
    Recovery,
    Login,
    Signup,
    Logout,
}

impl AuthOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthOperation::Recovery => "recovery",
            AuthOperation::Login => "login",
            AuthOperation::Signup => "signup",
            AuthOperation::Logout => "logout",
        }
    }
}

impl fmt::Display for AuthOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a subscriber can read about the session.
///
/// `loading` and `error` describe the in-progress transition and the last
/// transition's failure; they are not states of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub loading: bool,
    pub error: Option<String>,
    pub operation: Option<AuthOperation>,
}

impl SessionSnapshot {
    /// Snapshot at first activation, before recovery resolves
    pub fn initial() -> Self {
        Self {
            state: SessionState::Unknown,
            loading: true,
            error: None,
            operation: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }

    pub fn is_busy(&self) -> bool {
        self.operation.is_some()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}
