//! Core types for Via Fitness.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cep;
pub mod cpf;
pub mod email;
pub mod id;
pub mod price;

pub use cep::{Cep, CepError};
pub use cpf::{Cpf, CpfError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
