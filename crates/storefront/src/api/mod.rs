//! Via Fitness API client.
//!
//! # Architecture
//!
//! - The API is the source of truth; the storefront keeps no business data
//! - JSON over `reqwest`, bearer tokens on authenticated calls
//! - The product list is cached in memory via `moka` (60 second TTL) and
//!   invalidated when a product is added through this client
//!
//! # Example
//!
//! ```rust,ignore
//! use viafitness_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config)?;
//! let session = api.login("ana@example.com", "s3nha").await?;
//! let addresses = api.addresses(&SecretString::from(session.access)).await?;
//! ```

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use viafitness_core::{Address, AddressId, NewAddress, ValidProduct};

use crate::config::StorefrontConfig;

pub use types::{
    ApiUser, AvatarResponse, LoginRequest, LoginResponse, Product, Profile, RegisterRequest,
    Upload,
};

/// Longest response body excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

/// How long the product list stays cached.
const PRODUCTS_TTL: Duration = Duration::from_secs(60);

const PRODUCTS_KEY: &str = "products";

/// Errors that can occur when calling the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, timeout, broken body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered 401.
    #[error("Unauthorized")]
    Unauthorized,

    /// The API answered 400.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The API answered 404.
    #[error("Not found")]
    NotFound,

    /// Any other non-success status.
    #[error("Unexpected status {status}")]
    Status { status: StatusCode, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint path could not be joined to the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Broad classification used to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Network,
    Validation,
    Auth,
    Other,
}

impl ApiError {
    #[must_use]
    pub const fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Http(_) => ApiErrorKind::Network,
            Self::Validation(_) => ApiErrorKind::Validation,
            Self::Unauthorized => ApiErrorKind::Auth,
            Self::NotFound | Self::Status { .. } | Self::Parse(_) | Self::Url(_) => {
                ApiErrorKind::Other
            }
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Via Fitness API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<&'static str, Arc<Vec<Product>>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .user_agent(concat!("viafitness-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let products = Cache::builder()
            .max_capacity(1)
            .time_to_live(PRODUCTS_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: with_trailing_slash(config.api_url.clone()),
                products,
            }),
        })
    }

    /// Base URL of the API.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve a media reference (`/media/x.png` or an absolute URL)
    /// against the API base.
    #[must_use]
    pub fn media_url(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        self.inner
            .base_url
            .join(reference)
            .ok()
            .map(String::from)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and map non-success statuses to errors.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let excerpt = truncate(&body);
        match status {
            StatusCode::UNAUTHORIZED => {
                debug!(body = %excerpt, "API rejected credentials");
                Err(ApiError::Unauthorized)
            }
            StatusCode::BAD_REQUEST => {
                tracing::warn!(body = %excerpt, "API rejected request data");
                Err(ApiError::Validation(excerpt))
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            _ => {
                tracing::error!(status = %status, body = %excerpt, "API returned non-success status");
                Err(ApiError::Status {
                    status,
                    body: excerpt,
                })
            }
        }
    }

    /// Read a JSON body, logging it when it does not parse.
    async fn json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(error = %e, body = %truncate(&text), "Failed to parse API response");
            ApiError::Parse(e)
        })
    }

    fn get(&self, path: &str, token: Option<&SecretString>) -> Result<reqwest::RequestBuilder, ApiError> {
        let request = self.inner.client.get(self.endpoint(path)?);
        Ok(authorize(request, token))
    }

    fn post(&self, path: &str, token: Option<&SecretString>) -> Result<reqwest::RequestBuilder, ApiError> {
        let request = self.inner.client.post(self.endpoint(path)?);
        Ok(authorize(request, token))
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Call `GET /api/hello/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn hello(&self) -> Result<(), ApiError> {
        self.send(self.get("api/hello/", None)?).await?;
        Ok(())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Create an account with `POST /register/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the registration.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<(), ApiError> {
        self.send(self.post("register/", None)?.json(request)).await?;
        Ok(())
    }

    /// Exchange credentials for tokens with `POST /login/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for wrong credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { email, password };
        let response = self.send(self.post("login/", None)?.json(&body)).await?;
        Self::json(response).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(products) = self.inner.products.get(PRODUCTS_KEY).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let response = self.send(self.get("products/", None)?).await?;
        let products: Arc<Vec<Product>> = Arc::new(Self::json(response).await?);
        self.inner
            .products
            .insert(PRODUCTS_KEY, Arc::clone(&products))
            .await;
        Ok(products)
    }

    /// Create a product with `POST /products/add/` and drop the cached list.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is no longer valid and
    /// [`ApiError::Validation`] when the API rejects the data.
    #[instrument(skip(self, token, product, photo), fields(name = %product.name))]
    pub async fn add_product(
        &self,
        token: &SecretString,
        product: &ValidProduct,
        photo: Upload,
    ) -> Result<(), ApiError> {
        let part = Part::bytes(photo.bytes)
            .file_name(photo.file_name)
            .mime_str(&photo.content_type)?;
        let form = product
            .form_fields()
            .into_iter()
            .fold(Form::new().part("photo", part), |form, (name, value)| {
                form.text(name, value)
            });

        self.send(self.post("products/add/", Some(token))?.multipart(form))
            .await?;
        self.inner.products.invalidate(PRODUCTS_KEY).await;
        Ok(())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Fetch `GET /profile/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is no longer valid.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &SecretString) -> Result<Profile, ApiError> {
        let response = self.send(self.get("profile/", Some(token))?).await?;
        Self::json(response).await
    }

    /// Fetch the avatar URL with `GET /profile/avatar/`, resolved against the
    /// API base.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is no longer valid.
    #[instrument(skip(self, token))]
    pub async fn avatar(&self, token: &SecretString) -> Result<Option<String>, ApiError> {
        let response = self.send(self.get("profile/avatar/", Some(token))?).await?;
        let avatar: AvatarResponse = Self::json(response).await?;
        Ok(avatar.avatar_url.as_deref().and_then(|url| self.media_url(url)))
    }

    /// Replace the avatar with `POST /profile/avatar/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is no longer valid.
    #[instrument(skip(self, token, upload), fields(file = %upload.file_name))]
    pub async fn upload_avatar(
        &self,
        token: &SecretString,
        upload: Upload,
    ) -> Result<Option<String>, ApiError> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = Form::new().part("avatar", part);

        let response = self
            .send(self.post("profile/avatar/", Some(token))?.multipart(form))
            .await?;
        let avatar: AvatarResponse = Self::json(response).await?;
        Ok(avatar.avatar_url.as_deref().and_then(|url| self.media_url(url)))
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// List addresses with `GET /profile/addresses/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is no longer valid.
    #[instrument(skip(self, token))]
    pub async fn addresses(&self, token: &SecretString) -> Result<Vec<Address>, ApiError> {
        let response = self
            .send(self.get("profile/addresses/", Some(token))?)
            .await?;
        Self::json(response).await
    }

    /// Create an address with `POST /profile/addresses/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the API rejects the address.
    #[instrument(skip(self, token, address), fields(is_default = address.is_default))]
    pub async fn create_address(
        &self,
        token: &SecretString,
        address: &NewAddress,
    ) -> Result<Address, ApiError> {
        let response = self
            .send(self.post("profile/addresses/", Some(token))?.json(address))
            .await?;
        Self::json(response).await
    }

    /// Delete an address with `DELETE /profile/addresses/:id/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the address does not belong to the
    /// user.
    #[instrument(skip(self, token))]
    pub async fn delete_address(&self, token: &SecretString, id: AddressId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("profile/addresses/{id}/"))?;
        let request = authorize(self.inner.client.delete(url), Some(token));
        self.send(request).await?;
        Ok(())
    }
}

fn authorize(request: reqwest::RequestBuilder, token: Option<&SecretString>) -> reqwest::RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token.expose_secret()),
        None => request,
    }
}

/// Make relative joins append to the base path instead of replacing its
/// last segment.
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
