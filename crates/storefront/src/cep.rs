//! `ViaCEP` postal code lookup.
//!
//! `GET {base}/ws/{cep}/json/` answers with the street, neighbourhood, city
//! and state of a CEP, or `{"erro": true}` when the CEP does not exist.
//! Found addresses are cached for an hour.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use viafitness_core::{Cep, CepError};

use crate::config::StorefrontConfig;

const CEP_TTL: Duration = Duration::from_secs(60 * 60);

/// Errors from a CEP lookup. The display strings are shown to the user.
#[derive(Debug, Error)]
pub enum CepLookupError {
    #[error(transparent)]
    Invalid(#[from] CepError),

    #[error("CEP não encontrado")]
    NotFound,

    #[error("Erro ao buscar CEP")]
    Http(#[from] reqwest::Error),

    #[error("Erro ao buscar CEP")]
    Status(reqwest::StatusCode),

    #[error("Erro ao buscar CEP")]
    Url(#[from] url::ParseError),
}

/// The parts of an address `ViaCEP` knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CepAddress {
    pub cep: Cep,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

impl ViaCepResponse {
    /// `ViaCEP` has answered both `true` and `"true"`.
    fn is_error(&self) -> bool {
        match &self.erro {
            None | Some(serde_json::Value::Null | serde_json::Value::Bool(false)) => false,
            Some(serde_json::Value::String(s)) => s != "false",
            Some(_) => true,
        }
    }
}

/// Client for `ViaCEP`.
#[derive(Clone)]
pub struct CepClient {
    inner: Arc<CepClientInner>,
}

struct CepClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<Cep, CepAddress>,
}

impl CepClient {
    /// Create a new lookup client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CepClientInner {
                client,
                base_url: crate::api::with_trailing_slash(config.cep_url.clone()),
                cache: Cache::builder()
                    .max_capacity(10_000)
                    .time_to_live(CEP_TTL)
                    .build(),
            }),
        })
    }

    /// Look up raw user input.
    ///
    /// # Errors
    ///
    /// Returns [`CepLookupError::Invalid`] before any request when the input
    /// is not 8 digits.
    pub async fn lookup_input(&self, input: &str) -> Result<CepAddress, CepLookupError> {
        let cep = Cep::parse(input)?;
        self.lookup(&cep).await
    }

    /// Look up a CEP.
    ///
    /// # Errors
    ///
    /// Returns [`CepLookupError::NotFound`] for unknown CEPs and a transport
    /// or status error when the service cannot answer.
    #[instrument(skip(self), fields(cep = %cep))]
    pub async fn lookup(&self, cep: &Cep) -> Result<CepAddress, CepLookupError> {
        if let Some(address) = self.inner.cache.get(cep).await {
            debug!("Cache hit for CEP");
            return Ok(address);
        }

        let url = self
            .inner
            .base_url
            .join(&format!("ws/{}/json/", cep.as_str()))?;
        let response = self.inner.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "ViaCEP returned non-success status");
            return Err(CepLookupError::Status(status));
        }

        let body: ViaCepResponse = response.json().await?;
        if body.is_error() {
            return Err(CepLookupError::NotFound);
        }

        let address = CepAddress {
            cep: cep.clone(),
            street: body.logradouro,
            neighborhood: body.bairro,
            city: body.localidade,
            state: body.uf,
        };
        self.inner.cache.insert(cep.clone(), address.clone()).await;
        Ok(address)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_flag_variants() {
        for (json, expected) in [
            (r#"{"erro": true}"#, true),
            (r#"{"erro": "true"}"#, true),
            (r#"{"erro": false, "uf": "SP"}"#, false),
            (r#"{"uf": "SP"}"#, false),
        ] {
            let response: ViaCepResponse = serde_json::from_str(json).unwrap();
            assert_eq!(response.is_error(), expected, "{json}");
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(CepLookupError::NotFound.to_string(), "CEP não encontrado");
        assert_eq!(
            CepLookupError::Status(reqwest::StatusCode::BAD_GATEWAY).to_string(),
            "Erro ao buscar CEP"
        );
        assert_eq!(
            CepLookupError::from(CepError::InvalidLength).to_string(),
            "CEP deve ter 8 dígitos"
        );
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_request() {
        let config = StorefrontConfig::from_source(|key| {
            (key == "STOREFRONT_CEP_URL").then(|| "http://127.0.0.1:1".to_string())
        })
        .unwrap();
        let client = CepClient::new(&config).unwrap();
        let err = client.lookup_input("123").await.unwrap_err();
        assert!(matches!(err, CepLookupError::Invalid(_)));
    }
}
