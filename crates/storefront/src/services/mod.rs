//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Login and registration against the API
//! - `addresses` - Address book rules applied around the API's address endpoints

pub mod addresses;
pub mod auth;

pub use addresses::{AddressError, AddressService};
pub use auth::{AuthError, AuthService, Registration};
