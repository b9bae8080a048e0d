//! Domain models for storefront.

pub mod session;

pub use session::{ProductSelections, SessionUser, keys};
