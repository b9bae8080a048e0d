//! Authentication service.
//!
//! Validates the login and register forms, then exchanges credentials for
//! tokens with the API. Nothing is sent when a required field is blank.

mod error;

pub use error::AuthError;

use viafitness_core::Email;

use crate::api::{ApiClient, ApiError, LoginResponse, RegisterRequest};
use crate::models::SessionUser;

/// Result of a registration: the user stored right after `POST /register/`
/// and the automatic login that followed.
#[derive(Debug)]
pub struct Registration {
    pub user: SessionUser,
    pub login: LoginResponse,
}

/// Authentication service.
pub struct AuthService<'a> {
    api: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingLoginFields` without calling the API when a
    /// field is blank, and `AuthError::InvalidCredentials` when the API
    /// answers 401 or 400.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingLoginFields);
        }

        match self.api.login(email, password).await {
            Ok(response) => Ok(response),
            Err(ApiError::Unauthorized | ApiError::Validation(_)) => {
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => Err(AuthError::Api(e)),
        }
    }

    /// Register an account, then log in with the same credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingRegisterFields` or `AuthError::InvalidEmail`
    /// without calling the API when the form is incomplete, and
    /// `AuthError::RegistrationRejected` when the API refuses the account.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Registration, AuthError> {
        let username = username.trim();
        if username.is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingRegisterFields);
        }
        let email = Email::parse(email)?;

        self.api
            .register(&RegisterRequest {
                username,
                email: email.as_str(),
                password,
            })
            .await
            .map_err(AuthError::RegistrationRejected)?;
        tracing::info!(username, "Account registered");

        let user = SessionUser {
            name: username.to_string(),
            email: email.to_string(),
            avatar_url: None,
        };
        let login = self.login(email.as_str(), password).await?;

        Ok(Registration { user, login })
    }
}
