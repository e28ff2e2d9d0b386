//! Login and signup forms
//!
//! Validation failures stay inside the form: they are reported per field and
//! never reach the session store or the transport.

use crate::api::{Credentials, Registration, Transport, User};
use crate::navigation::Navigator;
use crate::session::{SessionError, SessionStore};
use thiserror::Error;

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub username: Option<&'static str>,
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }

    /// Messages in field order
    pub fn messages(&self) -> Vec<&'static str> {
        [self.username, self.email, self.password]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{}", .0.messages().join(", "))]
    Invalid(FieldErrors),
    #[error("A submission is already in progress")]
    AlreadySubmitting,
    #[error(transparent)]
    Session(#[from] SessionError),
}

fn require(value: &str) -> bool {
    !value.trim().is_empty()
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    username: String,
    password: String,
    errors: FieldErrors,
    submitting: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Editing a field clears that field's error
    pub fn set_username(&mut self, value: impl Into<String>) {
        self.username = value.into();
        self.errors.username = None;
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.password = value.into();
        self.errors.password = None;
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn validate(&mut self) -> bool {
        self.errors = FieldErrors {
            username: (!require(&self.username)).then_some(USERNAME_REQUIRED),
            email: None,
            // Passwords are not trimmed
            password: self.password.is_empty().then_some(PASSWORD_REQUIRED),
        };
        self.errors.is_empty()
    }

    pub async fn submit<T, N>(&mut self, store: &SessionStore<T, N>) -> Result<User, FormError>
    where
        T: Transport,
        N: Navigator,
    {
        if self.submitting {
            return Err(FormError::AlreadySubmitting);
        }
        if !self.validate() {
            tracing::debug!(errors = ?self.errors, "Login form validation failed");
            return Err(FormError::Invalid(self.errors.clone()));
        }

        self.submitting = true;
        let result = store
            .login(Credentials::new(self.username.clone(), self.password.clone()))
            .await;
        self.submitting = false;

        Ok(result?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    username: String,
    email: String,
    password: String,
    errors: FieldErrors,
    submitting: bool,
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_username(&mut self, value: impl Into<String>) {
        self.username = value.into();
        self.errors.username = None;
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
        self.errors.email = None;
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.password = value.into();
        self.errors.password = None;
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn validate(&mut self) -> bool {
        self.errors = FieldErrors {
            username: (!require(&self.username)).then_some(USERNAME_REQUIRED),
            email: (!require(&self.email)).then_some(EMAIL_REQUIRED),
            password: self.password.is_empty().then_some(PASSWORD_REQUIRED),
        };
        self.errors.is_empty()
    }

    pub async fn submit<T, N>(&mut self, store: &SessionStore<T, N>) -> Result<User, FormError>
    where
        T: Transport,
        N: Navigator,
    {
        if self.submitting {
            return Err(FormError::AlreadySubmitting);
        }
        if !self.validate() {
            tracing::debug!(errors = ?self.errors, "Signup form validation failed");
            return Err(FormError::Invalid(self.errors.clone()));
        }

        self.submitting = true;
        let result = store
            .signup(Registration::new(
                self.username.clone(),
                self.email.trim(),
                self.password.clone(),
            ))
            .await;
        self.submitting = false;

        Ok(result?)
    }
}
