//! Session store runtime
//!
//! Owns the authoritative [`SessionSnapshot`], applies pure transitions
//! atomically, and executes the resulting effects. Consumers read immutable
//! snapshots through `watch` receivers and mutate only through the four
//! operations.

use super::transition::{transition, TransitionError};
use super::{AuthOperation, Effect, Event, SessionSnapshot, SessionState};
use crate::api::{ApiClient, Credentials, Registration, Transport, TransportError, User};
use crate::navigation::Navigator;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Failure of a session operation, returned after the snapshot is updated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Another transition was still awaiting the service; nothing changed
    #[error("Cannot start {requested} while {current} is in progress")]
    Busy {
        current: AuthOperation,
        requested: AuthOperation,
    },
    #[error(transparent)]
    Transition(TransitionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SessionError {
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionError::Busy { .. })
    }
}

impl From<TransitionError> for SessionError {
    fn from(error: TransitionError) -> Self {
        match error {
            TransitionError::Busy { current, requested } => SessionError::Busy { current, requested },
            other => SessionError::Transition(other),
        }
    }
}

/// Settles the operation a `process` call started if that call is dropped
/// before the completion is applied, so the store never stays busy.
struct AbandonGuard<'a> {
    snapshot_tx: &'a watch::Sender<SessionSnapshot>,
    operation: Option<AuthOperation>,
}

impl AbandonGuard<'_> {
    fn disarm(&mut self) {
        self.operation = None;
    }
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        let Some(operation) = self.operation else {
            return;
        };
        self.snapshot_tx.send_if_modified(|snapshot| {
            if snapshot.operation != Some(operation) {
                return false;
            }
            tracing::warn!(%operation, "Session operation abandoned before completion");
            snapshot.operation = None;
            snapshot.loading = false;
            // Logout never leaves a user behind; nothing settles to Unknown
            if operation == AuthOperation::Logout || snapshot.state == SessionState::Unknown {
                snapshot.state = SessionState::Anonymous;
            }
            true
        });
    }
}

/// How a transport completion resolved the in-flight operation
enum Completion {
    Authenticated(User),
    SignedOut,
    Failed(TransportError),
}

impl Completion {
    fn of(event: &Event) -> Option<Self> {
        match event {
            Event::AuthSucceeded { user, .. } => Some(Completion::Authenticated(user.clone())),
            Event::LogoutCompleted => Some(Completion::SignedOut),
            Event::AuthFailed { error, .. } | Event::LogoutFailed { error } => {
                Some(Completion::Failed(error.clone()))
            }
            _ => None,
        }
    }
}

/// Process-wide record of the current user identity
pub struct SessionStore<T, N> {
    api: Arc<ApiClient<T>>,
    navigator: N,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<T, N> SessionStore<T, N>
where
    T: Transport,
    N: Navigator,
{
    pub fn new(api: Arc<ApiClient<T>>, navigator: N) -> Self {
        let (snapshot_tx, _rx) = watch::channel(SessionSnapshot::initial());
        Self {
            api,
            navigator,
            snapshot_tx,
        }
    }

    /// Current snapshot (owned copy)
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Startup recovery: resolve Unknown into Anonymous or Authenticated.
    ///
    /// Never reports the "no session" answer or a failed check as an error;
    /// only a rejected request (busy) is returned as `Err`.
    pub async fn recover(&self) -> Result<SessionState, SessionError> {
        self.process(Event::RecoveryRequested).await?;
        Ok(self.snapshot().state)
    }

    pub async fn login(&self, credentials: Credentials) -> Result<User, SessionError> {
        let completion = self.process(Event::LoginRequested { credentials }).await?;
        Self::expect_user(AuthOperation::Login, completion)
    }

    pub async fn signup(&self, registration: Registration) -> Result<User, SessionError> {
        let completion = self.process(Event::SignupRequested { registration }).await?;
        Self::expect_user(AuthOperation::Signup, completion)
    }

    /// Always ends Anonymous on the landing view; a transport failure is
    /// recorded and returned but does not block the local sign-out.
    pub async fn logout(&self) -> Result<(), SessionError> {
        match self.process(Event::LogoutRequested).await? {
            Some(Completion::SignedOut) => Ok(()),
            Some(Completion::Failed(error)) => Err(error.into()),
            _ => Err(Self::unresolved(AuthOperation::Logout)),
        }
    }

    fn expect_user(
        operation: AuthOperation,
        completion: Option<Completion>,
    ) -> Result<User, SessionError> {
        match completion {
            Some(Completion::Authenticated(user)) => Ok(user),
            Some(Completion::Failed(error)) => Err(error.into()),
            _ => Err(Self::unresolved(operation)),
        }
    }

    fn unresolved(operation: AuthOperation) -> SessionError {
        TransitionError::InvalidTransition(format!("{operation} finished without a result")).into()
    }

    /// Run an event and every event its effects generate
    async fn process(&self, event: Event) -> Result<Option<Completion>, SessionError> {
        let mut events_to_process = vec![event];
        let mut completion = None;
        let mut guard = AbandonGuard {
            snapshot_tx: &self.snapshot_tx,
            operation: None,
        };

        while let Some(current_event) = events_to_process.pop() {
            let observed = Completion::of(&current_event);
            let requested = current_event.requested_operation();
            let effects = self.apply(current_event)?;
            if requested.is_some() {
                guard.operation = requested;
            }
            if observed.is_some() {
                completion = observed;
            }

            for effect in effects {
                if let Some(generated_event) = self.execute_effect(effect).await {
                    events_to_process.push(generated_event);
                }
            }
        }

        guard.disarm();
        Ok(completion)
    }

    /// Apply one transition atomically and publish the new snapshot
    fn apply(&self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let mut outcome = Ok(Vec::new());

        self.snapshot_tx.send_if_modified(|snapshot| {
            match transition(snapshot, event) {
                Ok(result) => {
                    let changed = *snapshot != result.new_snapshot;
                    *snapshot = result.new_snapshot;
                    outcome = Ok(result.effects);
                    changed
                }
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });

        if let Err(e) = &outcome {
            tracing::warn!(error = %e, "Session transition rejected");
        }
        outcome
    }

    async fn execute_effect(&self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::FetchCurrentUser => Some(match self.api.current_user().await {
                Ok(user) => {
                    match &user {
                        Some(user) => tracing::info!(user_id = user.id, "Session recovered"),
                        None => tracing::info!("No existing session"),
                    }
                    Event::RecoveryResolved { user }
                }
                Err(error) => Event::RecoveryFailed { error },
            }),

            Effect::SubmitLogin { credentials } => Some(
                self.auth_completion(AuthOperation::Login, self.api.login(&credentials).await),
            ),

            Effect::SubmitSignup { registration } => Some(self.auth_completion(
                AuthOperation::Signup,
                self.api.signup(&registration).await,
            )),

            Effect::SubmitLogout => Some(match self.api.logout().await {
                Ok(()) => {
                    tracing::info!("Logged out");
                    Event::LogoutCompleted
                }
                Err(error) => Event::LogoutFailed { error },
            }),

            Effect::Navigate(route) => {
                self.navigator.navigate(route);
                None
            }

            Effect::ReportFailure { operation, message } => {
                tracing::error!(%operation, error = %message, "Session operation failed");
                None
            }
        }
    }

    fn auth_completion(
        &self,
        operation: AuthOperation,
        result: Result<User, TransportError>,
    ) -> Event {
        match result {
            Ok(user) => {
                tracing::info!(%operation, user_id = user.id, username = %user.username, "Authenticated");
                Event::AuthSucceeded { operation, user }
            }
            Err(error) => Event::AuthFailed { operation, error },
        }
    }
}
