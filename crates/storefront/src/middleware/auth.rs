//! Authentication extractors.
//!
//! A visitor is logged in while the session holds an access token. The
//! extractors read the session from request extensions (set by
//! `SessionManagerLayer`).

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use tower_sessions::Session;

use crate::api::LoginResponse;
use crate::models::{SessionUser, keys};

/// A logged-in visitor.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Bearer token for API calls.
    pub token: SecretString,
    pub user: SessionUser,
    pub is_superuser: bool,
}

/// Extractor that requires a logged-in visitor.
///
/// Visitors without an access token are redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireAuth(auth): RequireAuth) -> impl IntoResponse {
///     format!("Olá, {}!", auth.user.name)
/// }
/// ```
pub struct RequireAuth(pub AuthSession);

/// Extractor that requires a logged-in superuser.
///
/// Anonymous visitors are redirected to the login page; other users get 403.
pub struct RequireSuperuser(pub AuthSession);

/// Extractor that optionally gets the logged-in visitor.
pub struct OptionalAuth(pub Option<AuthSession>);

/// Error returned when authentication is required but missing.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// Logged in without the required permission.
    Forbidden,
    /// The session layer is missing from the stack.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Acesso restrito").into_response(),
            Self::MissingSession => {
                tracing::error!("Session extension missing; is the session layer installed?");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Read the logged-in visitor from the session.
///
/// A stored user without a token is not a login: the token is what the API
/// checks.
pub async fn load_auth_session(session: &Session) -> Option<AuthSession> {
    let token: String = session.get(keys::ACCESS_TOKEN).await.ok().flatten()?;
    if token.is_empty() {
        return None;
    }
    let user: SessionUser = session
        .get(keys::USER)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    let is_superuser: bool = session
        .get(keys::IS_SUPERUSER)
        .await
        .ok()
        .flatten()
        .unwrap_or(false);

    Some(AuthSession {
        token: SecretString::from(token),
        user,
        is_superuser,
    })
}

fn session_from_parts(parts: &Parts) -> Result<&Session, AuthRejection> {
    parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::MissingSession)
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts)?;
        load_auth_session(session)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl<S> FromRequestParts<S> for RequireSuperuser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(auth) = RequireAuth::from_request_parts(parts, state).await?;
        if auth.is_superuser {
            Ok(Self(auth))
        } else {
            Err(AuthRejection::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = match parts.extensions.get::<Session>() {
            Some(session) => load_auth_session(session).await,
            None => None,
        };
        Ok(Self(auth))
    }
}

/// Store the tokens and user of a successful login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_session(
    session: &Session,
    login: &LoginResponse,
    user: &SessionUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::ACCESS_TOKEN, &login.access).await?;
    session.insert(keys::REFRESH_TOKEN, &login.refresh).await?;
    session.insert(keys::USER, user).await?;
    session
        .insert(keys::IS_SUPERUSER, login.user.is_superuser)
        .await?;
    // New privilege level, new session id.
    session.cycle_id().await
}

/// Store the user alone, before the tokens arrive.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_session_user(
    session: &Session,
    user: &SessionUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::USER, user).await
}

/// Remove every credential key from the session (logout, expired token).
///
/// Theme and product selections survive.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    for key in keys::CREDENTIALS {
        session.remove_value(key).await?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::ExposeSecret;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::api::ApiUser;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn login() -> LoginResponse {
        LoginResponse {
            access: "access-1".to_owned(),
            refresh: "refresh-1".to_owned(),
            user: ApiUser {
                username: "ana".to_owned(),
                email: "ana@example.com".to_owned(),
                is_superuser: true,
                ..ApiUser::default()
            },
        }
    }

    #[tokio::test]
    async fn test_set_and_load() {
        let session = session();
        assert!(load_auth_session(&session).await.is_none());

        let login = login();
        set_auth_session(&session, &login, &SessionUser::from(&login.user))
            .await
            .unwrap();

        let auth = load_auth_session(&session).await.unwrap();
        assert_eq!(auth.token.expose_secret(), "access-1");
        assert!(auth.is_superuser);
        assert_eq!(auth.user.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_user_without_token_is_anonymous() {
        let session = session();
        set_session_user(&session, &SessionUser::default())
            .await
            .unwrap();
        assert!(load_auth_session(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_keeps_theme() {
        let session = session();
        let login = login();
        set_auth_session(&session, &login, &SessionUser::from(&login.user))
            .await
            .unwrap();
        session.insert(keys::DARK_MODE, true).await.unwrap();

        clear_auth_session(&session).await.unwrap();

        assert!(load_auth_session(&session).await.is_none());
        let refresh: Option<String> = session.get(keys::REFRESH_TOKEN).await.unwrap();
        assert!(refresh.is_none());
        let dark: Option<bool> = session.get(keys::DARK_MODE).await.unwrap();
        assert_eq!(dark, Some(true));
    }
}
