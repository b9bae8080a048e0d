//! Via Fitness Core - Shared domain types.
//!
//! This crate provides the types and rules used by the storefront binary
//! and its tests:
//! - [`types`] - Newtype wrappers for ids, emails, prices, CEP and CPF
//! - [`address`] - Shipping addresses and the per-user address book rules
//! - [`selection`] - Product card interaction state (image, size, quantity)
//! - [`product`] - Product upload form validation
//! - [`text`] - Display helpers (initials, product titles)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Every persistence decision is made by the external API; this
//! crate only encodes the rules the storefront enforces before calling it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod product;
pub mod selection;
pub mod text;
pub mod types;

pub use address::{
    Address, AddressBook, AddressBookError, AddressDraft, AddressDraftError, AddressField,
    AddressRemoval, NewAddress,
};
pub use product::{ProductDraft, ProductField, ProductFieldErrors, ValidProduct};
pub use selection::{
    ProductSelection, Quantity, SelectionAction, SelectionActionError, Size, next_index,
    previous_index,
};
pub use text::{format_product_title, initials};
pub use types::*;
