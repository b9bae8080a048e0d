//! Shipping addresses and the address book rules.
//!
//! The API stores addresses; the storefront enforces two rules before it
//! writes: a user keeps at most [`AddressBook::MAX_ADDRESSES`] addresses, and
//! exactly one of them is the default. The API has no update endpoint, so
//! changing the default means re-creating the address with `is_default` set
//! (the API clears the flag on the others) and deleting the old record.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{AddressId, Cep, CepError, Cpf, CpfError};

/// A saved address as returned by `GET /profile/addresses/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub street: String,
    #[serde(default)]
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub complement: String,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default, alias = "isDefault")]
    pub is_default: bool,
}

impl Address {
    /// Payload that re-creates this address, with the given default flag.
    #[must_use]
    pub fn recreate(&self, is_default: bool) -> NewAddress {
        NewAddress {
            street: self.street.clone(),
            neighborhood: self.neighborhood.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            number: self.number.clone(),
            complement: self.complement.clone(),
            cpf: self.cpf.clone(),
            is_default,
        }
    }

    /// One-line summary: `Rua X, Nº 10, Apto 2, Cidade - UF`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = self.street.clone();
        if !self.number.is_empty() {
            line.push_str(", Nº ");
            line.push_str(&self.number);
        }
        if !self.complement.is_empty() {
            line.push_str(", ");
            line.push_str(&self.complement);
        }
        format!("{line}, {} - {}", self.city, self.state)
    }

    /// The postal code as `NNNNN-NNN` when it parses, raw otherwise.
    #[must_use]
    pub fn postal_code_display(&self) -> String {
        Cep::parse(&self.postal_code).map_or_else(|_| self.postal_code.clone(), |c| c.formatted())
    }
}

/// Body of `POST /profile/addresses/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub number: String,
    pub complement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    pub is_default: bool,
}

/// Fields of the add-address form that must be filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    PostalCode,
    Street,
    Number,
    City,
    State,
}

impl AddressField {
    /// Form label, as shown next to the input.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PostalCode => "CEP",
            Self::Street => "Rua",
            Self::Number => "Número",
            Self::City => "Cidade",
            Self::State => "Estado",
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors validating an [`AddressDraft`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressDraftError {
    #[error("O campo {0} é obrigatório")]
    Missing(AddressField),
    #[error(transparent)]
    Cep(#[from] CepError),
    #[error(transparent)]
    Cpf(#[from] CpfError),
}

/// The add-address form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressDraft {
    pub postal_code: String,
    pub street: String,
    pub neighborhood: String,
    pub number: String,
    pub complement: String,
    pub city: String,
    pub state: String,
    pub cpf: String,
    pub is_default: bool,
}

impl AddressDraft {
    /// Check required fields, the CEP and (when given) the CPF.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, in form order.
    pub fn validate(&self) -> Result<NewAddress, AddressDraftError> {
        let required = [
            (AddressField::PostalCode, &self.postal_code),
            (AddressField::Street, &self.street),
            (AddressField::Number, &self.number),
            (AddressField::City, &self.city),
            (AddressField::State, &self.state),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(AddressDraftError::Missing(*field));
        }

        let cep = Cep::parse(&self.postal_code)?;
        let cpf = match self.cpf.trim() {
            "" => None,
            raw => Some(Cpf::parse(raw)?),
        };

        Ok(NewAddress {
            street: self.street.trim().to_owned(),
            neighborhood: self.neighborhood.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_uppercase(),
            postal_code: cep.into(),
            number: self.number.trim().to_owned(),
            complement: self.complement.trim().to_owned(),
            cpf: cpf.map(Into::into),
            is_default: self.is_default,
        })
    }
}

/// Errors applying an address book rule.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressBookError {
    #[error("Limite de 3 endereços atingido")]
    LimitReached,
    #[error("Endereço não encontrado")]
    NotFound(AddressId),
}

/// What removing an address requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRemoval {
    /// The address to delete.
    pub removed: AddressId,
    /// Address to promote to default afterwards, when the removed one was
    /// the default and others remain.
    pub promoted: Option<Address>,
}

/// A user's saved addresses, as last read from the API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    addresses: Vec<Address>,
}

impl AddressBook {
    /// Maximum number of addresses per user.
    pub const MAX_ADDRESSES: usize = 3;

    /// Build from the API's list, ordered by id.
    ///
    /// Exactly one address is flagged default afterwards: the first one the
    /// API flagged, or the first address when none was.
    #[must_use]
    pub fn from_server(mut addresses: Vec<Address>) -> Self {
        addresses.sort_by_key(|a| a.id);
        let default_at = addresses.iter().position(|a| a.is_default).unwrap_or(0);
        for (i, address) in addresses.iter_mut().enumerate() {
            address.is_default = i == default_at;
        }
        Self { addresses }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.addresses.len() >= Self::MAX_ADDRESSES
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.addresses.iter()
    }

    #[must_use]
    pub fn get(&self, id: AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    /// Prepare `address` for creation.
    ///
    /// The first address is always the default.
    ///
    /// # Errors
    ///
    /// Returns [`AddressBookError::LimitReached`] when the book is full.
    pub fn prepare_add(&self, mut address: NewAddress) -> Result<NewAddress, AddressBookError> {
        if self.is_full() {
            return Err(AddressBookError::LimitReached);
        }
        if self.is_empty() {
            address.is_default = true;
        }
        Ok(address)
    }

    /// Payload that makes `id` the default, or `None` when it already is.
    ///
    /// # Errors
    ///
    /// Returns [`AddressBookError::NotFound`] for an unknown id.
    pub fn prepare_set_default(
        &self,
        id: AddressId,
    ) -> Result<Option<NewAddress>, AddressBookError> {
        let address = self.get(id).ok_or(AddressBookError::NotFound(id))?;
        Ok((!address.is_default).then(|| address.recreate(true)))
    }

    /// Plan the removal of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AddressBookError::NotFound`] for an unknown id.
    pub fn prepare_remove(&self, id: AddressId) -> Result<AddressRemoval, AddressBookError> {
        let address = self.get(id).ok_or(AddressBookError::NotFound(id))?;
        let promoted = if address.is_default {
            self.addresses.iter().find(|a| a.id != id).cloned()
        } else {
            None
        };
        Ok(AddressRemoval {
            removed: id,
            promoted,
        })
    }
}

impl<'a> IntoIterator for &'a AddressBook {
    type Item = &'a Address;
    type IntoIter = std::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address(id: i64, is_default: bool) -> Address {
        Address {
            id: AddressId::new(id),
            street: format!("Rua {id}"),
            neighborhood: "Centro".to_owned(),
            city: "Belo Horizonte".to_owned(),
            state: "MG".to_owned(),
            postal_code: "30140071".to_owned(),
            number: "10".to_owned(),
            complement: String::new(),
            cpf: None,
            is_default,
        }
    }

    fn draft() -> AddressDraft {
        AddressDraft {
            postal_code: "30140-071".to_owned(),
            street: "Rua da Bahia".to_owned(),
            number: "1000".to_owned(),
            city: "Belo Horizonte".to_owned(),
            state: "mg".to_owned(),
            ..AddressDraft::default()
        }
    }

    #[test]
    fn test_from_server_keeps_single_default() {
        let book = AddressBook::from_server(vec![
            address(3, true),
            address(1, false),
            address(2, true),
        ]);
        let defaults: Vec<_> = book.iter().filter(|a| a.is_default).map(|a| a.id).collect();
        assert_eq!(defaults, vec![AddressId::new(2)]);
        assert_eq!(book.iter().next().unwrap().id, AddressId::new(1));
    }

    #[test]
    fn test_from_server_flags_first_when_none_default() {
        let book = AddressBook::from_server(vec![address(5, false), address(4, false)]);
        assert_eq!(book.default_address().unwrap().id, AddressId::new(4));
    }

    #[test]
    fn test_first_address_becomes_default() {
        let book = AddressBook::default();
        let new = book.prepare_add(draft().validate().unwrap()).unwrap();
        assert!(new.is_default);
    }

    #[test]
    fn test_limit_reached() {
        let book = AddressBook::from_server(vec![
            address(1, true),
            address(2, false),
            address(3, false),
        ]);
        assert!(book.is_full());
        let err = book.prepare_add(draft().validate().unwrap()).unwrap_err();
        assert_eq!(err, AddressBookError::LimitReached);
        assert_eq!(err.to_string(), "Limite de 3 endereços atingido");
    }

    #[test]
    fn test_set_default() {
        let book = AddressBook::from_server(vec![address(1, true), address(2, false)]);
        assert!(book.prepare_set_default(AddressId::new(1)).unwrap().is_none());
        let payload = book.prepare_set_default(AddressId::new(2)).unwrap().unwrap();
        assert!(payload.is_default);
        assert_eq!(payload.street, "Rua 2");
        assert_eq!(
            book.prepare_set_default(AddressId::new(9)),
            Err(AddressBookError::NotFound(AddressId::new(9)))
        );
    }

    #[test]
    fn test_remove_default_promotes_first_remaining() {
        let book = AddressBook::from_server(vec![
            address(1, true),
            address(2, false),
            address(3, false),
        ]);
        let plan = book.prepare_remove(AddressId::new(1)).unwrap();
        assert_eq!(plan.promoted.unwrap().id, AddressId::new(2));

        let plan = book.prepare_remove(AddressId::new(3)).unwrap();
        assert!(plan.promoted.is_none());

        let single = AddressBook::from_server(vec![address(7, true)]);
        assert!(single.prepare_remove(AddressId::new(7)).unwrap().promoted.is_none());
    }

    #[test]
    fn test_draft_validation() {
        let new = draft().validate().unwrap();
        assert_eq!(new.postal_code, "30140071");
        assert_eq!(new.state, "MG");
        assert!(new.cpf.is_none());

        let missing = AddressDraft {
            number: "  ".to_owned(),
            ..draft()
        };
        assert_eq!(
            missing.validate(),
            Err(AddressDraftError::Missing(AddressField::Number))
        );

        let bad_cep = AddressDraft {
            postal_code: "123".to_owned(),
            ..draft()
        };
        assert_eq!(bad_cep.validate().unwrap_err().to_string(), "CEP deve ter 8 dígitos");

        let bad_cpf = AddressDraft {
            cpf: "111.111.111-11".to_owned(),
            ..draft()
        };
        assert_eq!(bad_cpf.validate(), Err(AddressDraftError::Cpf(CpfError::InvalidChecksum)));

        let good_cpf = AddressDraft {
            cpf: "529.982.247-25".to_owned(),
            ..draft()
        };
        assert_eq!(good_cpf.validate().unwrap().cpf.as_deref(), Some("52998224725"));
    }

    #[test]
    fn test_deserialize_accepts_camel_case_default() {
        let json = r#"{"id":1,"street":"A","neighborhood":"B","city":"C","state":"SP","postal_code":"01001000","isDefault":true}"#;
        let address: Address = serde_json::from_str(json).unwrap();
        assert!(address.is_default);
        assert_eq!(address.number, "");
    }

    #[test]
    fn test_summary() {
        let mut a = address(1, true);
        a.complement = "Apto 2".to_owned();
        assert_eq!(a.summary(), "Rua 1, Nº 10, Apto 2, Belo Horizonte - MG");
        assert_eq!(a.postal_code_display(), "30140-071");
    }
}
