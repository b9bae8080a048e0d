//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers return `Result<T, AppError>`
//! when a failure ends the request; form handlers that re-render with a
//! message handle their errors themselves.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::{ApiError, ApiErrorKind};
use crate::messages;
use crate::middleware::SessionExpired;

/// Where a visitor whose token was rejected is sent.
pub const SESSION_EXPIRED_REDIRECT: &str = "/login?error=session_expired";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// API call failed.
    #[error("API error: {0}")]
    Api(ApiError),

    /// The API rejected the visitor's access token.
    #[error("Session expired")]
    SessionExpired,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Logged in without the required permission.
    #[error("Forbidden")]
    Forbidden,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => Self::SessionExpired,
            other => Self::Api(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::SessionExpired) {
            let mut response = Redirect::to(SESSION_EXPIRED_REDIRECT).into_response();
            response.extensions_mut().insert(SessionExpired);
            return response;
        }

        // Capture server errors to Sentry
        if matches!(self, Self::Api(_) | Self::Session(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Api(err) => match err {
                ApiError::NotFound => StatusCode::NOT_FOUND,
                ApiError::Validation(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SessionExpired => StatusCode::SEE_OTHER,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Api(err) if err.kind() == ApiErrorKind::Network => {
                messages::CONNECTION_ERROR.to_string()
            }
            Self::Api(ApiError::NotFound) | Self::NotFound(_) => "Não encontrado".to_string(),
            Self::Api(ApiError::Validation(_)) => messages::INVALID_DATA.to_string(),
            Self::Api(_) => "Serviço indisponível. Tente novamente.".to_string(),
            Self::Forbidden => "Acesso restrito".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Session(_) | Self::Internal(_) | Self::SessionExpired => {
                "Erro interno".to_string()
            }
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after a login.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("address", "Added address", Some(&[("count", "2")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("product 9".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AppError::BadRequest("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: String::new(),
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_unauthorized_becomes_session_expired() {
        let err = AppError::from(ApiError::Unauthorized);
        assert!(matches!(err, AppError::SessionExpired));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            SESSION_EXPIRED_REDIRECT
        );
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }
}
