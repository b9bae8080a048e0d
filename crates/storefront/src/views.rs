//! Page chrome shared by every template.
//!
//! Each template struct carries a [`LayoutView`] with the theme, the header
//! user menu and asset paths; `base.html` renders it.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Datelike;
use tower_sessions::Session;

use crate::middleware::load_auth_session;
use crate::models::keys;

/// Header user menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub name: String,
    pub initials: String,
    pub avatar_url: Option<String>,
}

/// Data rendered by `base.html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutView {
    pub dark_mode: bool,
    pub user: Option<UserView>,
    pub is_superuser: bool,
    /// Path of the current page, used as the theme toggle's return target.
    pub current_path: String,
    pub css_path: &'static str,
    pub year: i32,
}

impl LayoutView {
    /// Logo variant for the current theme.
    #[must_use]
    pub const fn logo_path(&self) -> &'static str {
        if self.dark_mode {
            "/static/img/logo-dark.svg"
        } else {
            "/static/img/logo-light.svg"
        }
    }

    /// Read theme and user from the session.
    pub async fn from_session(session: &Session, current_path: &str) -> Self {
        let dark_mode: bool = session
            .get(keys::DARK_MODE)
            .await
            .ok()
            .flatten()
            .unwrap_or(false);
        let auth = load_auth_session(session).await;

        Self {
            dark_mode,
            is_superuser: auth.as_ref().is_some_and(|a| a.is_superuser),
            user: auth.map(|a| UserView {
                initials: a.user.initials(),
                name: a.user.name,
                avatar_url: a.user.avatar_url,
            }),
            current_path: current_path.to_string(),
            css_path: css_path(),
            year: chrono::Utc::now().year(),
        }
    }
}

/// Stylesheet path, with the content hash from the build script when known.
fn css_path() -> &'static str {
    const HASH: &str = env!("CSS_HASH");
    if HASH.is_empty() {
        "/static/css/main.css"
    } else {
        concat!("/static/css/derived/main.", env!("CSS_HASH"), ".css")
    }
}

/// Extractor for the [`LayoutView`] of the current request.
pub struct Layout(pub LayoutView);

impl<S> FromRequestParts<S> for Layout
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts
            .uri
            .path_and_query()
            .map_or("/", |pq| pq.as_str())
            .to_string();
        let view = match parts.extensions.get::<Session>() {
            Some(session) => LayoutView::from_session(session, &path).await,
            None => LayoutView {
                dark_mode: false,
                user: None,
                is_superuser: false,
                current_path: path,
                css_path: css_path(),
                year: chrono::Utc::now().year(),
            },
        };
        Ok(Self(view))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;
    use crate::api::{ApiUser, LoginResponse};
    use crate::middleware::set_auth_session;
    use crate::models::SessionUser;

    #[tokio::test]
    async fn test_anonymous_light_layout() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let view = LayoutView::from_session(&session, "/").await;
        assert!(!view.dark_mode);
        assert!(view.user.is_none());
        assert_eq!(view.logo_path(), "/static/img/logo-light.svg");
        assert!(view.css_path.starts_with("/static/css/"));
    }

    #[tokio::test]
    async fn test_logged_in_dark_layout() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session.insert(keys::DARK_MODE, true).await.unwrap();
        let login = LoginResponse {
            access: "a".to_owned(),
            refresh: "r".to_owned(),
            user: ApiUser {
                name: "Maria Souza".to_owned(),
                ..ApiUser::default()
            },
        };
        set_auth_session(&session, &login, &SessionUser::from(&login.user))
            .await
            .unwrap();

        let view = LayoutView::from_session(&session, "/profile").await;
        assert!(view.dark_mode);
        assert_eq!(view.user.as_ref().unwrap().initials, "MS");
        assert!(!view.is_superuser);
        assert_eq!(view.logo_path(), "/static/img/logo-dark.svg");
    }
}
