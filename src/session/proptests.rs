//! Property-based tests for the session state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::api::{Credentials, Registration, TransportError, User};
use crate::navigation::Route;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_user() -> impl Strategy<Value = User> {
    (1i64..10_000, "[a-z]{3,12}").prop_map(|(id, username)| User {
        id,
        email: format!("{username}@x.com"),
        username,
    })
}

fn arb_transport_error() -> impl Strategy<Value = TransportError> {
    prop_oneof![
        "[a-zA-Z ]{1,30}".prop_map(|m| TransportError::server(400, m)),
        (500u16..600).prop_map(|s| TransportError::server(s, format!("HTTP error! status: {s}"))),
        Just(TransportError::network()),
        Just(TransportError::decode()),
        Just(TransportError::unauthenticated("Please log in")),
    ]
}

fn arb_operation() -> impl Strategy<Value = AuthOperation> {
    prop_oneof![
        Just(AuthOperation::Recovery),
        Just(AuthOperation::Login),
        Just(AuthOperation::Signup),
        Just(AuthOperation::Logout),
    ]
}

fn arb_session_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Unknown),
        Just(SessionState::Anonymous),
        arb_user().prop_map(|user| SessionState::Authenticated { user }),
    ]
}

fn arb_snapshot() -> impl Strategy<Value = SessionSnapshot> {
    (
        arb_session_state(),
        proptest::option::of(arb_operation()),
        proptest::option::of("[a-z ]{1,20}"),
    )
        .prop_map(|(state, operation, error)| SessionSnapshot {
            state,
            loading: operation.is_some(),
            error,
            operation,
        })
}

fn arb_request_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::RecoveryRequested),
        ("[a-z]{1,8}", "[a-z]{1,8}").prop_map(|(u, p)| Event::LoginRequested {
            credentials: Credentials::new(u, p),
        }),
        ("[a-z]{1,8}", "[a-z]{1,8}").prop_map(|(u, p)| Event::SignupRequested {
            registration: Registration::new(u.clone(), format!("{u}@x.com"), p),
        }),
        Just(Event::LogoutRequested),
    ]
}

fn arb_completion_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        proptest::option::of(arb_user()).prop_map(|user| Event::RecoveryResolved { user }),
        arb_transport_error().prop_map(|error| Event::RecoveryFailed { error }),
        (arb_operation(), arb_user())
            .prop_map(|(operation, user)| Event::AuthSucceeded { operation, user }),
        (arb_operation(), arb_transport_error())
            .prop_map(|(operation, error)| Event::AuthFailed { operation, error }),
        Just(Event::LogoutCompleted),
        arb_transport_error().prop_map(|error| Event::LogoutFailed { error }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![arb_request_event(), arb_completion_event()]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Authenticated is only ever entered from a completion carrying a user
    #[test]
    fn authenticated_requires_user_from_service(snapshot in arb_snapshot(), event in arb_event()) {
        let was_authenticated = snapshot.state.is_authenticated();
        let carries_user = matches!(
            &event,
            Event::AuthSucceeded { .. } | Event::RecoveryResolved { user: Some(_) }
        );

        if let Ok(result) = transition(&snapshot, event) {
            if result.new_snapshot.state.is_authenticated() && !was_authenticated {
                prop_assert!(carries_user);
            }
        }
    }

    /// While an operation is in flight every new request is rejected untouched
    #[test]
    fn requests_rejected_while_busy(
        snapshot in arb_snapshot().prop_filter("busy", SessionSnapshot::is_busy),
        event in arb_request_event(),
    ) {
        let result = transition(&snapshot, event);
        let is_busy = matches!(result, Err(TransitionError::Busy { .. }));
        prop_assert!(is_busy);
    }

    /// Requests from an idle snapshot always start loading and clear the error
    #[test]
    fn requests_from_idle_start_loading(
        snapshot in arb_snapshot().prop_filter("idle", |s| !s.is_busy()),
        event in arb_request_event(),
    ) {
        let requested = event.requested_operation();
        let result = transition(&snapshot, event).unwrap();
        prop_assert!(result.new_snapshot.loading);
        prop_assert_eq!(result.new_snapshot.error, None);
        prop_assert_eq!(result.new_snapshot.operation, requested);
        prop_assert_eq!(result.effects.len(), 1);
    }

    /// Every accepted completion clears loading and the in-flight operation
    #[test]
    fn completions_settle(snapshot in arb_snapshot(), event in arb_completion_event()) {
        if let Ok(result) = transition(&snapshot, event) {
            prop_assert!(!result.new_snapshot.loading);
            prop_assert_eq!(result.new_snapshot.operation, None);
            prop_assert!(result.new_snapshot.state != SessionState::Unknown);
        }
    }

    /// Logout resolves to Anonymous on the landing view whatever the outcome
    #[test]
    fn logout_always_ends_anonymous(
        state in arb_session_state(),
        error in proptest::option::of(arb_transport_error()),
    ) {
        let idle = SessionSnapshot { state, loading: false, error: None, operation: None };
        let started = transition(&idle, Event::LogoutRequested).unwrap();
        prop_assert_eq!(&started.new_snapshot.state, &SessionState::Anonymous);

        let completion = match error {
            Some(error) => Event::LogoutFailed { error },
            None => Event::LogoutCompleted,
        };
        let done = transition(&started.new_snapshot, completion).unwrap();
        prop_assert_eq!(done.new_snapshot.state, SessionState::Anonymous);
        prop_assert!(done.effects.contains(&Effect::Navigate(Route::Landing)));
    }

    /// Failures always populate the error field with the transport message
    #[test]
    fn auth_failure_records_message(
        operation in prop_oneof![Just(AuthOperation::Login), Just(AuthOperation::Signup)],
        state in arb_session_state(),
        error in arb_transport_error(),
    ) {
        let in_flight = SessionSnapshot {
            state,
            loading: true,
            error: None,
            operation: Some(operation),
        };
        let message = error.message.clone();
        let result = transition(&in_flight, Event::AuthFailed { operation, error }).unwrap();
        prop_assert_eq!(result.new_snapshot.state, SessionState::Anonymous);
        prop_assert_eq!(result.new_snapshot.error, Some(message));
        let navigates = result.effects.iter().any(|e| matches!(e, Effect::Navigate(_)));
        prop_assert!(!navigates);
    }
}
