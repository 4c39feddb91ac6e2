//! Barcode lookup API client.
//!
//! Enriches a barcode with descriptive product metadata from the external
//! lookup service.
//!
//! # API Reference
//!
//! - Base URL: `https://api.barcodelookup.com/v3`
//! - Endpoint: `GET /products?barcode=<barcode>&formatted=y&key=<key>`
//! - Authentication: API key in the `key` query parameter
//!
//! # Outcomes
//!
//! | Upstream answer               | Result                          |
//! |-------------------------------|---------------------------------|
//! | 2xx with at least one product | `Ok(Some(LookupProduct))`       |
//! | 2xx with no products, or 404  | `Ok(None)`                      |
//! | 401 / 403                     | `Err(LookupError::Unauthorized)`|
//! | 429                           | `Err(LookupError::RateLimited)` |
//! | other status / transport      | `Err(LookupError::Api / Http)`  |
//!
//! Requests are never retried.

mod types;

pub use types::*;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use thiserror::Error;
use url::Url;

use crate::config::BarcodeLookupConfig;

/// Errors that make a lookup undeliverable.
///
/// "No such product" is not an error; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the lookup service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unauthorized (invalid API key).
    #[error("Unauthorized: invalid API key")]
    Unauthorized,
}

/// Capability that maps a barcode to product metadata.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Look up a barcode. `Ok(None)` means the barcode is unknown upstream.
    async fn lookup(&self, barcode: &str) -> Result<Option<LookupProduct>, LookupError>;
}

/// Barcode lookup API client.
#[derive(Clone)]
pub struct BarcodeLookupClient {
    inner: Arc<BarcodeLookupClientInner>,
}

struct BarcodeLookupClientInner {
    client: reqwest::Client,
    config: BarcodeLookupConfig,
}

impl BarcodeLookupClient {
    /// Create a new lookup client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BarcodeLookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("barcode-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BarcodeLookupClientInner {
                client,
                config: config.clone(),
            }),
        })
    }

    /// Build the request URL for a barcode. Contains the API key; never log it.
    fn products_url(&self, barcode: &str) -> Result<Url, LookupError> {
        let base = self.inner.config.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/products"))
            .map_err(|e| LookupError::Parse(format!("Invalid lookup URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("barcode", barcode)
            .append_pair("formatted", "y")
            .append_pair("key", self.inner.config.api_key.expose_secret());

        Ok(url)
    }

    /// Handle API response and pick the first product.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<LookupProduct>, LookupError> {
        let status = response.status();

        if status.is_success() {
            let body: ProductsResponse = response
                .json()
                .await
                .map_err(|e| LookupError::Parse(format!("Failed to parse response: {e}")))?;
            return Ok(body.products.into_iter().next().map(LookupProduct::from));
        }

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Err(self.parse_error(response).await)
    }

    /// Parse error response from the lookup API.
    async fn parse_error(&self, response: reqwest::Response) -> LookupError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return LookupError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return LookupError::Unauthorized;
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        LookupError::Api { status, message }
    }
}

#[async_trait]
impl ProductLookup for BarcodeLookupClient {
    #[tracing::instrument(skip(self))]
    async fn lookup(&self, barcode: &str) -> Result<Option<LookupProduct>, LookupError> {
        let url = self.products_url(barcode)?;

        let response = self
            .inner
            .client
            .get(url)
            .send()
            .await
            // The URL carries the API key
            .map_err(|e| LookupError::Http(e.without_url()))?;

        let result = self.handle_response(response).await;
        match &result {
            Ok(Some(_)) => tracing::debug!("Barcode found upstream"),
            Ok(None) => tracing::debug!("Barcode not found upstream"),
            Err(e) => tracing::warn!(error = %e, "Barcode lookup failed"),
        }
        result
    }
}

impl std::fmt::Debug for BarcodeLookupClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarcodeLookupClient")
            .field("base_url", &self.inner.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}
