//! Brazilian postal code (CEP).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Cep`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CepError {
    /// The input is not 8 digits (optionally `NNNNN-NNN`).
    #[error("CEP deve ter 8 dígitos")]
    InvalidLength,
}

/// A CEP, stored as its 8 digits without punctuation.
///
/// Accepts `01001000` and `01001-000`.
///
/// ```
/// use viafitness_core::Cep;
///
/// assert_eq!(Cep::parse("01001-000").unwrap().as_str(), "01001000");
/// assert_eq!(Cep::parse("01001000").unwrap().formatted(), "01001-000");
/// assert!(Cep::parse("0100100").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cep(String);

impl Cep {
    /// Number of digits in a CEP.
    pub const DIGITS: usize = 8;

    /// Parse a CEP from user input.
    ///
    /// # Errors
    ///
    /// Returns [`CepError::InvalidLength`] unless the trimmed input is eight
    /// ASCII digits, optionally with a single hyphen after the fifth.
    pub fn parse(s: &str) -> Result<Self, CepError> {
        let s = s.trim();
        let digits = match s.split_once('-') {
            Some((head, tail)) if head.len() == 5 && tail.len() == 3 => format!("{head}{tail}"),
            Some(_) => return Err(CepError::InvalidLength),
            None => s.to_owned(),
        };

        if digits.len() != Self::DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CepError::InvalidLength);
        }

        Ok(Self(digits))
    }

    /// The 8 digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The conventional `NNNNN-NNN` rendering.
    #[must_use]
    pub fn formatted(&self) -> String {
        let (head, tail) = self.0.split_at(5);
        format!("{head}-{tail}")
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Cep {
    type Error = CepError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cep> for String {
    fn from(cep: Cep) -> Self {
        cep.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_hyphenated() {
        assert_eq!(Cep::parse("30140071").unwrap().as_str(), "30140071");
        assert_eq!(Cep::parse(" 30140-071 ").unwrap().as_str(), "30140071");
    }

    #[test]
    fn test_rejects_wrong_lengths() {
        assert_eq!(Cep::parse(""), Err(CepError::InvalidLength));
        assert_eq!(Cep::parse("3014007"), Err(CepError::InvalidLength));
        assert_eq!(Cep::parse("301400711"), Err(CepError::InvalidLength));
        assert_eq!(Cep::parse("3014-0071"), Err(CepError::InvalidLength));
    }

    #[test]
    fn test_rejects_non_digits() {
        assert_eq!(Cep::parse("3014007a"), Err(CepError::InvalidLength));
    }

    #[test]
    fn test_error_message_is_user_facing() {
        assert_eq!(CepError::InvalidLength.to_string(), "CEP deve ter 8 dígitos");
    }

    #[test]
    fn test_serde_validates() {
        let cep: Cep = serde_json::from_str("\"30140-071\"").unwrap();
        assert_eq!(cep.formatted(), "30140-071");
        assert!(serde_json::from_str::<Cep>("\"123\"").is_err());
    }
}
