use async_trait::async_trait;
use sb_api_types::{
    BackendErrorResponse, Bech32Address, DelegationRequest, DelegationResponse, EpochParams, Utxo,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000/api/";
pub const BACKEND_URL_ENV: &str = "STAKEBRIDGE_BACKEND_URL";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("network error: {0}")]
    Network(String),
    /// Message reported by the backend, surfaced verbatim.
    #[error("{0}")]
    Backend(String),
    #[error("unexpected backend response: {0}")]
    InvalidResponse(String),
}

/// Remote state and submission endpoints used by the delegation flow.
#[async_trait(?Send)]
pub trait DelegationBackend {
    async fn fetch_utxos(&self, address: &Bech32Address) -> Result<Vec<Utxo>, SubmitError>;
    async fn fetch_epoch_params(&self) -> Result<EpochParams, SubmitError>;
    async fn submit_delegation(
        &self,
        request: &DelegationRequest,
    ) -> Result<DelegationResponse, SubmitError>;
}

/// HTTP adapter for the delegation backend.
///
/// Reads `STAKEBRIDGE_BACKEND_URL` from the environment at construction time
/// when no endpoint is given (default: `http://localhost:3000/api/`).
/// Endpoint paths are appended directly to the base, so the base always ends
/// with `/`.
pub struct HttpBackend {
    base: String,
    http: reqwest::Client,
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpBackend {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .filter(|value| !value.trim().is_empty())
            .or_else(|| std::env::var(BACKEND_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let mut base = endpoint.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, SubmitError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| SubmitError::Network(format!("{what} body: {err}")))?;

        if !status.is_success() {
            return Err(backend_error(status, &text));
        }

        serde_json::from_str(&text)
            .map_err(|err| SubmitError::InvalidResponse(format!("{what}: {err}")))
    }
}

// Non-2xx bodies carry `{ "error": "..." }`; anything else is reported with
// the status line.
fn backend_error(status: reqwest::StatusCode, text: &str) -> SubmitError {
    match serde_json::from_str::<BackendErrorResponse>(text) {
        Ok(body) => SubmitError::Backend(body.error),
        Err(_) => {
            warn!("backend returned HTTP {status} without an error body");
            SubmitError::Backend(format!("HTTP {status}: {}", text.trim()))
        }
    }
}

#[async_trait(?Send)]
impl DelegationBackend for HttpBackend {
    async fn fetch_utxos(&self, address: &Bech32Address) -> Result<Vec<Utxo>, SubmitError> {
        let response = self
            .http
            .get(self.url("utxos"))
            .query(&[("address", address.0.as_str())])
            .send()
            .await
            .map_err(|err| SubmitError::Network(format!("utxos: {err}")))?;

        let utxos: Vec<Utxo> = Self::read_json(response, "utxos").await?;
        debug!(count = utxos.len(), "fetched utxos");
        Ok(utxos)
    }

    async fn fetch_epoch_params(&self) -> Result<EpochParams, SubmitError> {
        let response = self
            .http
            .get(self.url("epoch-params"))
            .send()
            .await
            .map_err(|err| SubmitError::Network(format!("epoch-params: {err}")))?;

        Self::read_json(response, "epoch-params").await
    }

    async fn submit_delegation(
        &self,
        request: &DelegationRequest,
    ) -> Result<DelegationResponse, SubmitError> {
        let response = self
            .http
            .post(self.url("submit"))
            .json(request)
            .send()
            .await
            .map_err(|err| SubmitError::Network(format!("submit: {err}")))?;

        Self::read_json(response, "submit").await
    }
}
