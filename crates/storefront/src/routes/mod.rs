//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Banner and product cards
//! POST /products/{id}/select           - Card interaction (image, size, quantity, favourite)
//! POST /theme                          - Toggle dark mode
//!
//! # Auth
//! GET  /login                          - Login page
//! POST /login                          - Login action
//! GET  /register                       - Register choice screen (?form=1 for the form)
//! POST /register                       - Register action
//! POST /logout                         - Logout action
//!
//! # Profile (requires auth)
//! GET  /profile                        - Account data, avatar and addresses
//! POST /profile/cep                    - Fill the address form from a CEP
//! POST /profile/addresses              - Add an address
//! POST /profile/addresses/{id}/default - Make an address the default
//! POST /profile/addresses/{id}/delete  - Remove an address
//! POST /profile/avatar                 - Upload an avatar
//!
//! # Admin (requires a superuser)
//! GET  /admin/products/new             - Add-product form
//! POST /admin/products/new             - Add a product
//! ```

pub mod admin;
pub mod auth;
pub mod home;
pub mod profile;
pub mod theme;
pub mod upload;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Largest accepted upload body (avatar or product photo).
const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show))
        .route("/cep", post(profile::lookup_cep))
        .route("/addresses", post(profile::add_address))
        .route(
            "/addresses/{id}/default",
            post(profile::set_default_address),
        )
        .route("/addresses/{id}/delete", post(profile::remove_address))
        .route(
            "/avatar",
            post(profile::upload_avatar).layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
        )
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/products/new",
        get(admin::new_product)
            .post(admin::create_product)
            .layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
    )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products/{id}/select", post(home::select))
        .route("/theme", post(theme::toggle))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .nest("/profile", profile_routes())
        .nest("/admin", admin_routes())
}
