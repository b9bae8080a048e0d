//! Newtype IDs for type-safe entity references.
//!
//! The backend identifies users, products and addresses with integer primary
//! keys. Wrapping them keeps an address id from being passed where a product
//! id is expected.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `new()` / `get()`, `Display` and `FromStr`
///
/// # Example
///
/// ```rust
/// # use viafitness_core::define_id;
/// define_id!(OrderId);
///
/// let id: OrderId = "42".parse().unwrap();
/// assert_eq!(id.get(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from the backend's integer key.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying integer key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(UserId);
define_id!(ProductId);
define_id!(AddressId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: AddressId = " 17 ".parse().unwrap();
        assert_eq!(id, AddressId::new(17));
        assert_eq!(id.to_string(), "17");
        assert!("abc".parse::<AddressId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id: ProductId = serde_json::from_str("5").unwrap();
        assert_eq!(id.get(), 5);
        assert_eq!(serde_json::to_string(&id).unwrap(), "5");
    }
}
