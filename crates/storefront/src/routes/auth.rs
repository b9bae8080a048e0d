//! Authentication route handlers.
//!
//! Login and registration exchange credentials with the API and keep the
//! returned tokens in the session. A successful submit renders a
//! confirmation page that moves on to the shop after the configured delay.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::messages;
use crate::middleware::{OptionalAuth, clear_auth_session, set_auth_session};
use crate::models::SessionUser;
use crate::services::AuthService;
use crate::state::AppState;
use crate::views::{Layout, LayoutView};

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Query parameters for the register page.
#[derive(Debug, Deserialize)]
pub struct RegisterQuery {
    /// Any value skips the choice screen.
    pub form: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub layout: LayoutView,
    pub error: Option<&'static str>,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub layout: LayoutView,
    /// The form itself, rather than the register/login choice.
    pub show_form: bool,
    pub error: Option<&'static str>,
    pub username: String,
    pub email: String,
}

/// Confirmation shown after a login or registration.
#[derive(Template, WebTemplate)]
#[template(path = "auth_success.html")]
pub struct AuthSuccessTemplate {
    pub layout: LayoutView,
    pub title: &'static str,
    pub detail: &'static str,
    /// Seconds before the page moves on to `/`.
    pub redirect_delay: u64,
}

async fn success_page(state: &AppState, session: &Session, title: &'static str) -> Response {
    AuthSuccessTemplate {
        layout: LayoutView::from_session(session, "/").await,
        title,
        detail: messages::REDIRECTING,
        redirect_delay: state.config().redirect_delay.as_secs(),
    }
    .into_response()
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(auth): OptionalAuth,
    Layout(layout): Layout,
    Query(query): Query<LoginQuery>,
) -> Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        layout,
        error: query.error.as_deref().and_then(messages::error_message),
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, layout, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Layout(layout): Layout,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match AuthService::new(state.api())
        .login(&form.email, &form.password)
        .await
    {
        Ok(login) => {
            let mut user = SessionUser::from(&login.user);
            if user.email.is_empty() {
                user.email = form.email.trim().to_string();
            }
            set_auth_session(&session, &login, &user).await?;
            set_sentry_user(&user.email);
            tracing::info!(is_superuser = login.user.is_superuser, "Login succeeded");

            Ok(success_page(&state, &session, messages::LOGIN_SUCCESS).await)
        }
        Err(e) => {
            if !e.is_validation() {
                tracing::warn!(error = %e, "Login failed");
            }
            Ok(LoginTemplate {
                layout,
                error: Some(e.login_message()),
                email: form.email,
            }
            .into_response())
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the register choice screen or, with `?form`, the form.
pub async fn register_page(
    OptionalAuth(auth): OptionalAuth,
    Layout(layout): Layout,
    Query(query): Query<RegisterQuery>,
) -> Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }

    RegisterTemplate {
        layout,
        show_form: query.form.is_some(),
        error: None,
        username: String::new(),
        email: String::new(),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// A created account is logged in straight away.
#[instrument(skip(state, session, layout, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Layout(layout): Layout,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    match AuthService::new(state.api())
        .register(&form.username, &form.email, &form.password)
        .await
    {
        Ok(registration) => {
            set_auth_session(&session, &registration.login, &registration.user).await?;
            set_sentry_user(&registration.user.email);

            Ok(success_page(&state, &session, messages::REGISTER_SUCCESS).await)
        }
        Err(e) => {
            if !e.is_validation() {
                tracing::warn!(error = %e, "Registration failed");
            }
            Ok(RegisterTemplate {
                layout,
                show_form: true,
                error: Some(e.register_message()),
                username: form.username,
                email: form.email,
            }
            .into_response())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Forget the tokens and user; theme and card selections stay.
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_auth_session(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
