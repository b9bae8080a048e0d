//! Address book operations against the API.
//!
//! Every operation re-reads the list first, applies the
//! [`AddressBook`] rules, performs the writes and re-reads the list again;
//! the API stays the source of truth.

use secrecy::SecretString;
use thiserror::Error;
use tracing::instrument;

use viafitness_core::{AddressBook, AddressBookError, AddressId, NewAddress};

use crate::api::{ApiClient, ApiError};

/// Errors from an address book operation.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error(transparent)]
    Rule(#[from] AddressBookError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Address operations for one logged-in user.
pub struct AddressService<'a> {
    api: &'a ApiClient,
    token: &'a SecretString,
}

impl<'a> AddressService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, token: &'a SecretString) -> Self {
        Self { api, token }
    }

    /// Current address book.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn load(&self) -> Result<AddressBook, ApiError> {
        let addresses = self.api.addresses(self.token).await?;
        Ok(AddressBook::from_server(addresses))
    }

    /// Add an address; the first one becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `AddressBookError::LimitReached` when 3 addresses exist.
    #[instrument(skip(self, address))]
    pub async fn add(&self, address: NewAddress) -> Result<AddressBook, AddressError> {
        let book = self.load().await?;
        let address = book.prepare_add(address)?;
        self.api.create_address(self.token, &address).await?;
        Ok(self.load().await?)
    }

    /// Make `id` the default address.
    ///
    /// # Errors
    ///
    /// Returns `AddressBookError::NotFound` for an id the user does not own.
    #[instrument(skip(self))]
    pub async fn set_default(&self, id: AddressId) -> Result<AddressBook, AddressError> {
        let book = self.load().await?;
        if let Some(replacement) = book.prepare_set_default(id)? {
            self.replace(id, &replacement).await?;
        }
        Ok(self.load().await?)
    }

    /// Remove `id`, promoting the first remaining address when the default
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns `AddressBookError::NotFound` for an id the user does not own.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: AddressId) -> Result<AddressBook, AddressError> {
        let book = self.load().await?;
        let plan = book.prepare_remove(id)?;
        self.api.delete_address(self.token, plan.removed).await?;
        if let Some(promoted) = plan.promoted {
            self.replace(promoted.id, &promoted.recreate(true)).await?;
        }
        Ok(self.load().await?)
    }

    /// Re-create an address with new content and delete the old record.
    ///
    /// The API has no update endpoint. Creating with `is_default` set clears
    /// the flag on the user's other addresses. When the old record cannot be
    /// deleted the new one is deleted again, so the book never holds both.
    async fn replace(&self, old: AddressId, replacement: &NewAddress) -> Result<(), ApiError> {
        let created = self.api.create_address(self.token, replacement).await?;
        tracing::debug!(old = %old, new = %created.id, "Address re-created");

        if let Err(e) = self.api.delete_address(self.token, old).await {
            tracing::error!(
                old = %old,
                new = %created.id,
                error = %e,
                "Failed to delete replaced address; removing the copy"
            );
            if let Err(rollback) = self.api.delete_address(self.token, created.id).await {
                tracing::error!(
                    old = %old,
                    new = %created.id,
                    error = %rollback,
                    "Failed to remove the copy; address duplicated"
                );
            }
            return Err(e);
        }
        Ok(())
    }
}
