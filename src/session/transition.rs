//! Pure session state transition function

use super::{AuthOperation, Effect, Event, SessionSnapshot, SessionState};
use crate::navigation::Route;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_snapshot: SessionSnapshot,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(snapshot: SessionSnapshot) -> Self {
        Self {
            new_snapshot: snapshot,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Cannot start {requested} while {current} is in progress")]
    Busy {
        current: AuthOperation,
        requested: AuthOperation,
    },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function: same inputs, same outputs, no I/O.
///
/// A request arriving while another transition awaits the service is
/// rejected and leaves the snapshot untouched.
pub fn transition(
    snapshot: &SessionSnapshot,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    if let (Some(current), Some(requested)) = (snapshot.operation, event.requested_operation()) {
        return Err(TransitionError::Busy { current, requested });
    }

    match (snapshot.operation, event) {
        // ============================================================
        // Requests
        // ============================================================
        (None, Event::RecoveryRequested) => Ok(TransitionResult::new(begin(
            snapshot.state.clone(),
            AuthOperation::Recovery,
        ))
        .with_effect(Effect::FetchCurrentUser)),

        (None, Event::LoginRequested { credentials }) => Ok(TransitionResult::new(begin(
            snapshot.state.clone(),
            AuthOperation::Login,
        ))
        .with_effect(Effect::SubmitLogin { credentials })),

        (None, Event::SignupRequested { registration }) => Ok(TransitionResult::new(begin(
            snapshot.state.clone(),
            AuthOperation::Signup,
        ))
        .with_effect(Effect::SubmitSignup { registration })),

        // The local user is dropped before the call is issued, so the store
        // never reports Authenticated once the server session may be gone
        (None, Event::LogoutRequested) => Ok(TransitionResult::new(begin(
            SessionState::Anonymous,
            AuthOperation::Logout,
        ))
        .with_effect(Effect::SubmitLogout)),

        // ============================================================
        // Startup recovery
        // ============================================================
        (Some(AuthOperation::Recovery), Event::RecoveryResolved { user: Some(user) }) => {
            Ok(TransitionResult::new(settle(
                SessionState::Authenticated { user },
                None,
            )))
        }

        // No session is the baseline, not an error
        (Some(AuthOperation::Recovery), Event::RecoveryResolved { user: None }) => {
            Ok(TransitionResult::new(settle(SessionState::Anonymous, None)))
        }

        (Some(AuthOperation::Recovery), Event::RecoveryFailed { error }) => Ok(
            TransitionResult::new(settle(SessionState::Anonymous, Some(error.message.clone())))
                .with_effect(Effect::report(AuthOperation::Recovery, error.message)),
        ),

        // ============================================================
        // Login / signup
        // ============================================================
        (
            Some(current @ (AuthOperation::Login | AuthOperation::Signup)),
            Event::AuthSucceeded { operation, user },
        ) if current == operation => Ok(TransitionResult::new(settle(
            SessionState::Authenticated { user },
            None,
        ))
        .with_effect(Effect::Navigate(Route::Chat))),

        (
            Some(current @ (AuthOperation::Login | AuthOperation::Signup)),
            Event::AuthFailed { operation, error },
        ) if current == operation => Ok(TransitionResult::new(settle(
            SessionState::Anonymous,
            Some(error.message.clone()),
        ))
        .with_effect(Effect::report(operation, error.message))),

        // ============================================================
        // Logout: always ends Anonymous on the landing view
        // ============================================================
        (Some(AuthOperation::Logout), Event::LogoutCompleted) => {
            Ok(TransitionResult::new(settle(SessionState::Anonymous, None))
                .with_effect(Effect::Navigate(Route::Landing)))
        }

        (Some(AuthOperation::Logout), Event::LogoutFailed { error }) => Ok(TransitionResult::new(
            settle(SessionState::Anonymous, Some(error.message.clone())),
        )
        .with_effects([
            Effect::report(AuthOperation::Logout, error.message),
            Effect::Navigate(Route::Landing),
        ])),

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (operation, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {operation:?} with event {event:?}"
        ))),
    }
}

fn begin(state: SessionState, operation: AuthOperation) -> SessionSnapshot {
    SessionSnapshot {
        state,
        loading: true,
        error: None,
        operation: Some(operation),
    }
}

fn settle(state: SessionState, error: Option<String>) -> SessionSnapshot {
    SessionSnapshot {
        state,
        loading: false,
        error,
        operation: None,
    }
}
