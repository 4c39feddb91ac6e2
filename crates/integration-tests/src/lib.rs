//! Integration tests for the barcode catalog.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p barcode-catalog-integration-tests
//! ```
//!
//! Tests drive the full router with `tower::ServiceExt::oneshot` against a
//! [`MemoryProductStore`] and either a [`FakeLookup`] or the real
//! [`BarcodeLookupClient`](barcode_catalog_api::lookup::BarcodeLookupClient)
//! pointed at a `wiremock` server.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use barcode_catalog_api::db::MemoryProductStore;
use barcode_catalog_api::lookup::{LookupError, LookupProduct, ProductLookup};
use barcode_catalog_api::routes;
use barcode_catalog_api::state::AppState;
use barcode_catalog_core::Images;

/// Lookup double answering from a fixed table of barcodes.
#[derive(Debug, Default)]
pub struct FakeLookup {
    products: HashMap<String, LookupProduct>,
    failing: bool,
    calls: AtomicUsize,
}

impl FakeLookup {
    /// Lookup that knows no barcodes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lookup whose every call fails as an upstream error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Register a product for `barcode`.
    #[must_use]
    pub fn with_product(mut self, barcode: &str, product: LookupProduct) -> Self {
        self.products.insert(barcode.to_string(), product);
        self
    }

    /// Number of lookups performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductLookup for FakeLookup {
    async fn lookup(&self, barcode: &str) -> Result<Option<LookupProduct>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(LookupError::Api {
                status: 500,
                message: "upstream unavailable".to_string(),
            });
        }
        Ok(self.products.get(barcode).cloned())
    }
}

/// The widget every happy-path test ingests.
pub const WIDGET_BARCODE: &str = "012345678905";

/// Lookup attributes for [`WIDGET_BARCODE`].
#[must_use]
pub fn widget() -> LookupProduct {
    LookupProduct {
        title: Some("Widget".to_string()),
        description: Some("A useful widget".to_string()),
        category: Some("Tools".to_string()),
        manufacturer: Some("Acme".to_string()),
        brand: Some("Acme".to_string()),
        ingredients: None,
        images: Images::from(vec!["http://x/1.jpg".to_string()]),
    }
}

/// Test harness around the application router.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryProductStore>,
}

impl TestApp {
    /// Build an app over a fresh in-memory store.
    pub fn new(lookup: Arc<dyn ProductLookup>) -> Self {
        let store = Arc::new(MemoryProductStore::new());
        let state = AppState::new(lookup, store.clone());
        Self {
            router: routes::app(state),
            store,
        }
    }

    /// Send a request with an optional JSON body and decode the response.
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Send a raw JSON body, for malformed-input tests.
    pub async fn request_raw(&self, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }
}

/// App whose lookup knows only the widget.
#[must_use]
pub fn test_app() -> (TestApp, Arc<FakeLookup>) {
    let lookup = Arc::new(FakeLookup::empty().with_product(WIDGET_BARCODE, widget()));
    (TestApp::new(lookup.clone()), lookup)
}
