//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::cep::CepClient;
use crate::config::StorefrontConfig;
use crate::middleware::security_headers::content_security_policy;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the API clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    cep: CepClient,
    content_security_policy: String,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        let cep = CepClient::new(&config)?;
        let content_security_policy = content_security_policy(api.base_url());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                cep,
                content_security_policy,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Via Fitness API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the `ViaCEP` client.
    #[must_use]
    pub fn cep(&self) -> &CepClient {
        &self.inner.cep
    }

    /// The `Content-Security-Policy` header value.
    #[must_use]
    pub fn content_security_policy(&self) -> &str {
        &self.inner.content_security_policy
    }
}
