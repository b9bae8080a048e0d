//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame options, etc.)
//! 5. Session layer (tower-sessions with the in-memory store)
//! 6. Session expiry (clear credentials after an API 401)

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AuthRejection, AuthSession, OptionalAuth, RequireAuth, RequireSuperuser, clear_auth_session,
    load_auth_session, set_auth_session, set_session_user,
};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SessionExpired, create_session_layer, session_expiry_middleware};
