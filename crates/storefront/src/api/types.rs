//! Request and response bodies of the Via Fitness API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use viafitness_core::{Price, ProductId, UserId};

/// Body of `POST /register/`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /login/`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful `POST /login/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: ApiUser,
}

/// The `user` object of a login response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiUser {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_superuser: bool,
}

/// `GET /profile/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// `GET /profile/avatar/` and `POST /profile/avatar/` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvatarResponse {
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A product from `GET /products/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub wholesale_price: Option<Decimal>,
    pub retail_price: Decimal,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Product {
    /// Retail price in reais.
    #[must_use]
    pub const fn price(&self) -> Price {
        Price::brl(self.retail_price)
    }

    /// Image references: the main photo first, then the extra photos,
    /// without blanks or repeats.
    #[must_use]
    pub fn images(&self) -> Vec<&str> {
        let mut images: Vec<&str> = Vec::with_capacity(1 + self.photos.len());
        for image in self.photo.iter().chain(self.photos.iter()) {
            let image = image.trim();
            if !image.is_empty() && !images.contains(&image) {
                images.push(image);
            }
        }
        images
    }
}

/// A file received from a form, forwarded as a multipart part.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Whether the declared content type is an image.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_backend_json() {
        let json = r#"{
            "id": 3, "name": "topNadador", "quantity": 10, "color": null,
            "size": "M", "wholesale_price": "40.00", "retail_price": "89.90",
            "reference": "TN-1", "photo": "/media/products/top.png"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price().display(), "R$ 89,90");
        assert_eq!(product.images(), vec!["/media/products/top.png"]);
        assert!(product.color.is_none());
    }

    #[test]
    fn test_images_dedup_and_order() {
        let product = Product {
            id: ProductId::new(1),
            name: "x".to_owned(),
            quantity: None,
            color: None,
            size: None,
            wholesale_price: None,
            retail_price: Decimal::ONE,
            reference: String::new(),
            photo: Some("a.png".to_owned()),
            photos: vec!["b.png".to_owned(), "a.png".to_owned(), " ".to_owned()],
        };
        assert_eq!(product.images(), vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_login_response_without_user() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"access":"a","refresh":"r"}"#).unwrap();
        assert!(!response.user.is_superuser);
        assert_eq!(response.user.name, "");
    }

    #[test]
    fn test_upload_is_image() {
        let upload = Upload {
            file_name: "a.txt".to_owned(),
            content_type: "text/plain".to_owned(),
            bytes: vec![],
        };
        assert!(!upload.is_image());
    }
}
