//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions, and clears credentials
//! from the session when a handler reports that the API rejected its token.

use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::StorefrontConfig;
use crate::middleware::auth::clear_auth_session;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "vf_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Response extension set when the API answered 401 to the visitor's token.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Clear stored credentials when the response carries [`SessionExpired`].
///
/// Must sit inside the session layer so the `Session` extension exists.
pub async fn session_expiry_middleware(request: Request, next: Next) -> Response {
    let session = request.extensions().get::<Session>().cloned();
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some()
        && let Some(session) = session
    {
        tracing::info!("API rejected the access token; clearing credentials");
        if let Err(e) = clear_auth_session(&session).await {
            tracing::error!(error = %e, "Failed to clear expired session");
        }
    }

    response
}
