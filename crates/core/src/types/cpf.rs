//! Brazilian taxpayer ID (CPF).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Cpf`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpfError {
    /// Not 11 digits once `.` and `-` are removed.
    #[error("CPF deve ter 11 dígitos")]
    InvalidLength,
    /// All digits identical, or a check digit does not match.
    #[error("CPF inválido")]
    InvalidChecksum,
}

/// A CPF, stored as 11 digits without punctuation.
///
/// ```
/// use viafitness_core::Cpf;
///
/// let cpf = Cpf::parse("529.982.247-25").unwrap();
/// assert_eq!(cpf.as_str(), "52998224725");
/// assert_eq!(cpf.formatted(), "529.982.247-25");
/// assert!(Cpf::parse("111.111.111-11").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    /// Parse a CPF, accepting the `NNN.NNN.NNN-NN` punctuation.
    ///
    /// # Errors
    ///
    /// Returns [`CpfError::InvalidLength`] when the input does not hold 11
    /// digits and [`CpfError::InvalidChecksum`] when the check digits fail.
    pub fn parse(s: &str) -> Result<Self, CpfError> {
        let digits: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '.' | '-'))
            .collect();

        if digits.len() != 11 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CpfError::InvalidLength);
        }

        let values: Vec<u32> = digits.bytes().map(|b| u32::from(b - b'0')).collect();
        if values.iter().all(|&d| Some(&d) == values.first()) {
            return Err(CpfError::InvalidChecksum);
        }

        let (body, checks) = values.split_at(9);
        let first = check_digit(body);
        let mut with_first = body.to_vec();
        with_first.push(first);
        let second = check_digit(&with_first);

        if checks != [first, second] {
            return Err(CpfError::InvalidChecksum);
        }

        Ok(Self(digits))
    }

    /// The 11 digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The conventional `NNN.NNN.NNN-NN` rendering.
    #[must_use]
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!(
            "{}.{}.{}-{}",
            d.get(0..3).unwrap_or_default(),
            d.get(3..6).unwrap_or_default(),
            d.get(6..9).unwrap_or_default(),
            d.get(9..11).unwrap_or_default()
        )
    }
}

/// Modulo-11 check digit over `digits`, weights counting down to 2.
fn check_digit(digits: &[u32]) -> u32 {
    let weight_start = u32::try_from(digits.len()).unwrap_or(0) + 1;
    let sum: u32 = digits
        .iter()
        .zip((2..=weight_start).rev())
        .map(|(d, w)| d * w)
        .sum();
    let rest = (sum * 10) % 11;
    if rest == 10 { 0 } else { rest }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl TryFrom<String> for Cpf {
    type Error = CpfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Cpf::parse("52998224725").is_ok());
        assert!(Cpf::parse("529.982.247-25").is_ok());
        assert!(Cpf::parse("123.456.789-09").is_ok());
    }

    #[test]
    fn test_parse_wrong_check_digits() {
        assert_eq!(Cpf::parse("529.982.247-26"), Err(CpfError::InvalidChecksum));
        assert_eq!(Cpf::parse("123.456.789-00"), Err(CpfError::InvalidChecksum));
    }

    #[test]
    fn test_parse_repeated_digits() {
        assert_eq!(Cpf::parse("00000000000"), Err(CpfError::InvalidChecksum));
        assert_eq!(Cpf::parse("999.999.999-99"), Err(CpfError::InvalidChecksum));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(Cpf::parse(""), Err(CpfError::InvalidLength));
        assert_eq!(Cpf::parse("5299822472"), Err(CpfError::InvalidLength));
        assert_eq!(Cpf::parse("529x9822472"), Err(CpfError::InvalidLength));
    }

    #[test]
    fn test_display_formats() {
        let cpf = Cpf::parse("52998224725").unwrap();
        assert_eq!(cpf.to_string(), "529.982.247-25");
    }
}
