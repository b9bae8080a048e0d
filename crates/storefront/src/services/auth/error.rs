//! Authentication error types.

use thiserror::Error;

use crate::api::{ApiError, ApiErrorKind};
use crate::messages;

/// Errors that can occur during login and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password left blank on the login form.
    #[error("missing login fields")]
    MissingLoginFields,

    /// Username, email or password left blank on the register form.
    #[error("missing registration fields")]
    MissingRegisterFields,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] viafitness_core::EmailError),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The API refused the registration.
    #[error("registration rejected: {0}")]
    RegistrationRejected(ApiError),

    /// Any other API failure.
    #[error("api error: {0}")]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Message shown on the login page.
    #[must_use]
    pub fn login_message(&self) -> &'static str {
        match self {
            Self::MissingLoginFields | Self::MissingRegisterFields => {
                messages::MISSING_LOGIN_FIELDS
            }
            Self::InvalidEmail(_) => messages::INVALID_EMAIL,
            Self::Api(err) | Self::RegistrationRejected(err)
                if err.kind() == ApiErrorKind::Network =>
            {
                messages::CONNECTION_ERROR
            }
            Self::InvalidCredentials | Self::Api(_) | Self::RegistrationRejected(_) => {
                messages::INVALID_CREDENTIALS
            }
        }
    }

    /// Message shown on the register page.
    #[must_use]
    pub fn register_message(&self) -> &'static str {
        match self {
            Self::MissingLoginFields | Self::MissingRegisterFields => {
                messages::MISSING_REGISTER_FIELDS
            }
            Self::InvalidEmail(_) => messages::INVALID_EMAIL,
            Self::Api(err) | Self::RegistrationRejected(err)
                if err.kind() == ApiErrorKind::Network =>
            {
                messages::CONNECTION_ERROR
            }
            Self::InvalidCredentials | Self::Api(_) | Self::RegistrationRejected(_) => {
                messages::REGISTER_ERROR
            }
        }
    }

    /// Whether the failure was caught before calling the API.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingLoginFields | Self::MissingRegisterFields | Self::InvalidEmail(_)
        )
    }
}
