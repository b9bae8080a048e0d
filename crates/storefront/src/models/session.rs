//! Session-related types.
//!
//! Every piece of per-visitor state lives in the server-side session under
//! one of the [`keys`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use viafitness_core::{ProductId, ProductSelection, initials};

use crate::api::ApiUser;

/// Session-stored user identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Display name; the username when the account has no full name.
    pub name: String,
    pub email: String,
    /// Absolute avatar URL, once known.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl SessionUser {
    /// Initials for the header button.
    #[must_use]
    pub fn initials(&self) -> String {
        initials(&self.name)
    }
}

impl From<&ApiUser> for SessionUser {
    fn from(user: &ApiUser) -> Self {
        let name = if user.name.trim().is_empty() {
            user.username.clone()
        } else {
            user.name.clone()
        };
        Self {
            name,
            email: user.email.clone(),
            avatar_url: None,
        }
    }
}

/// Per-product card state, keyed by product id.
///
/// Keys are strings because the session serializes to JSON objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductSelections(HashMap<String, ProductSelection>);

impl ProductSelections {
    /// Selection for `id`, or the default one.
    #[must_use]
    pub fn get(&self, id: ProductId) -> ProductSelection {
        self.0.get(&id.to_string()).copied().unwrap_or_default()
    }

    pub fn set(&mut self, id: ProductId, selection: ProductSelection) {
        self.0.insert(id.to_string(), selection);
    }
}

/// Session keys.
pub mod keys {
    /// Bearer token for authenticated API calls.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Long-lived token returned at login.
    pub const REFRESH_TOKEN: &str = "refresh_token";

    /// The logged-in [`SessionUser`](super::SessionUser).
    pub const USER: &str = "user";

    /// Whether the logged-in user may add products.
    pub const IS_SUPERUSER: &str = "is_superuser";

    /// Dark mode flag.
    pub const DARK_MODE: &str = "dark_mode";

    /// [`ProductSelections`](super::ProductSelections) of the product cards.
    pub const PRODUCT_SELECTIONS: &str = "product_selections";

    /// Keys cleared on logout and on an expired token.
    pub const CREDENTIALS: [&str; 4] = [ACCESS_TOKEN, REFRESH_TOKEN, USER, IS_SUPERUSER];
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use viafitness_core::SelectionAction;

    use super::*;

    #[test]
    fn test_session_user_falls_back_to_username() {
        let api_user = ApiUser {
            username: "ana".to_owned(),
            email: "ana@example.com".to_owned(),
            ..ApiUser::default()
        };
        let user = SessionUser::from(&api_user);
        assert_eq!(user.name, "ana");
        assert_eq!(user.initials(), "AA");

        let named = ApiUser {
            name: "Ana Paula Lima".to_owned(),
            ..api_user
        };
        assert_eq!(SessionUser::from(&named).initials(), "AL");
    }

    #[test]
    fn test_selections_roundtrip_json_object() {
        let mut selections = ProductSelections::default();
        let mut selection = ProductSelection::default();
        selection.apply(SelectionAction::ToggleFavorite, 1);
        selections.set(ProductId::new(9), selection);

        let json = serde_json::to_value(&selections).unwrap();
        assert!(json.get("9").is_some());
        let back: ProductSelections = serde_json::from_value(json).unwrap();
        assert!(back.get(ProductId::new(9)).favorited);
        assert_eq!(back.get(ProductId::new(1)), ProductSelection::default());
    }
}
