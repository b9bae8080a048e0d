//! Product upload form validation.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Price;

/// A field of the add-product form that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProductField {
    Photo,
    Name,
    Quantity,
    WholesalePrice,
    RetailPrice,
    Reference,
}

impl ProductField {
    /// The form input name.
    #[must_use]
    pub const fn form_name(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Name => "name",
            Self::Quantity => "quantity",
            Self::WholesalePrice => "wholesale_price",
            Self::RetailPrice => "retail_price",
            Self::Reference => "reference",
        }
    }

    /// Message shown under the input when it fails validation.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Photo => "A foto do produto é obrigatória.",
            Self::Name => "Nome do produto é obrigatório.",
            Self::Quantity => "A quantidade deve ser maior que 0.",
            Self::WholesalePrice => "Preço de atacado é obrigatório e deve ser um número válido.",
            Self::RetailPrice => "Preço de varejo é obrigatório e deve ser um número válido.",
            Self::Reference => "Referência é obrigatória.",
        }
    }
}

/// Every field that failed validation, with its message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFieldErrors(BTreeMap<ProductField, &'static str>);

impl ProductFieldErrors {
    fn insert(&mut self, field: ProductField) {
        self.0.insert(field, field.message());
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: ProductField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductField, &'static str)> + '_ {
        self.0.iter().map(|(f, m)| (*f, *m))
    }
}

/// The add-product form as submitted, before validation.
///
/// The photo bytes stay with the caller; validation only needs to know
/// whether one was attached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub name: String,
    pub quantity: String,
    pub color: String,
    pub size: String,
    pub wholesale_price: String,
    pub retail_price: String,
    pub reference: String,
    #[serde(skip)]
    pub has_photo: bool,
}

/// A product that passed validation, ready to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProduct {
    pub name: String,
    pub quantity: u32,
    pub color: String,
    pub size: String,
    pub wholesale_price: Price,
    pub retail_price: Price,
    pub reference: String,
}

impl ValidProduct {
    /// Text fields of the multipart body, in the order the API documents
    /// them. Prices carry exactly two decimals.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("quantity", self.quantity.to_string()),
            ("color", self.color.clone()),
            ("size", self.size.clone()),
            ("wholesale_price", self.wholesale_price.to_wire()),
            ("retail_price", self.retail_price.to_wire()),
            ("reference", self.reference.clone()),
        ]
    }
}

impl ProductDraft {
    /// Validate every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns the failing fields when any check fails.
    pub fn validate(&self) -> Result<ValidProduct, ProductFieldErrors> {
        let mut errors = ProductFieldErrors::default();

        if self.name.trim().is_empty() {
            errors.insert(ProductField::Name);
        }
        let quantity = self.quantity.trim().parse::<u32>().ok().filter(|q| *q > 0);
        if quantity.is_none() {
            errors.insert(ProductField::Quantity);
        }
        let wholesale = parse_positive_decimal(&self.wholesale_price);
        if wholesale.is_none() {
            errors.insert(ProductField::WholesalePrice);
        }
        let retail = parse_positive_decimal(&self.retail_price);
        if retail.is_none() {
            errors.insert(ProductField::RetailPrice);
        }
        if self.reference.trim().is_empty() {
            errors.insert(ProductField::Reference);
        }
        if !self.has_photo {
            errors.insert(ProductField::Photo);
        }

        match (quantity, wholesale, retail) {
            (Some(quantity), Some(wholesale), Some(retail)) if errors.is_empty() => {
                Ok(ValidProduct {
                    name: self.name.trim().to_owned(),
                    quantity,
                    color: self.color.trim().to_owned(),
                    size: self.size.trim().to_owned(),
                    wholesale_price: Price::brl(wholesale),
                    retail_price: Price::brl(retail),
                    reference: self.reference.trim().to_owned(),
                })
            }
            _ => Err(errors),
        }
    }
}

/// Parse a price typed with either `.` or `,` as decimal separator.
fn parse_positive_decimal(raw: &str) -> Option<Decimal> {
    let normalized = raw.trim().replace(',', ".");
    Decimal::from_str(&normalized)
        .ok()
        .filter(|d| d.is_sign_positive() && !d.is_zero())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "LeggingFitness".to_owned(),
            quantity: "12".to_owned(),
            color: "Preto".to_owned(),
            size: "M".to_owned(),
            wholesale_price: "45".to_owned(),
            retail_price: "89,9".to_owned(),
            reference: "LG-001".to_owned(),
            has_photo: true,
        }
    }

    #[test]
    fn test_valid_product() {
        let product = draft().validate().unwrap();
        assert_eq!(product.quantity, 12);
        let fields = product.form_fields();
        assert!(fields.contains(&("wholesale_price", "45.00".to_owned())));
        assert!(fields.contains(&("retail_price", "89.90".to_owned())));
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = ProductDraft::default().validate().unwrap_err();
        assert_eq!(errors.len(), 6);
        assert_eq!(
            errors.get(ProductField::Name),
            Some("Nome do produto é obrigatório.")
        );
        assert_eq!(
            errors.get(ProductField::Photo),
            Some("A foto do produto é obrigatória.")
        );
    }

    #[test]
    fn test_non_positive_numbers_rejected() {
        let bad = ProductDraft {
            quantity: "0".to_owned(),
            wholesale_price: "-3".to_owned(),
            retail_price: "abc".to_owned(),
            ..draft()
        };
        let errors = bad.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(
            fields,
            vec![
                ProductField::Quantity,
                ProductField::WholesalePrice,
                ProductField::RetailPrice
            ]
        );
    }

    #[test]
    fn test_missing_photo_only() {
        let errors = ProductDraft {
            has_photo: false,
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get(ProductField::Photo).is_some());
    }
}
