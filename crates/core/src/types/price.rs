//! Prices in Brazilian reais.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::selection::Quantity;

/// A price with currency information.
///
/// The backend stores prices as two-decimal `DecimalField`s and returns them
/// as strings (`"199.90"`); `Decimal` accepts both strings and numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in reais.
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::BRL)
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity.get()),
            currency_code: self.currency_code,
        }
    }

    /// Amount with exactly two decimal places and a dot separator, the
    /// format the backend's decimal fields accept (`"249.90"`).
    #[must_use]
    pub fn to_wire(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.2}")
    }

    /// Format for display, Brazilian style: `R$ 1.234,56`.
    #[must_use]
    pub fn display(&self) -> String {
        let wire = self.to_wire();
        let (negative, digits) = wire
            .strip_prefix('-')
            .map_or((false, wire.as_str()), |rest| (true, rest));
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        let sign = if negative { "-" } else { "" };
        format!("{}{sign}{grouped},{frac_part}", self.currency_code.symbol())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
}

impl CurrencyCode {
    /// Display prefix, including the separating space.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BRL => "R$ ",
            Self::USD => "US$ ",
        }
    }
}
