//! End-to-end ingestion through the real lookup client against a mock server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use barcode_catalog_api::config::BarcodeLookupConfig;
use barcode_catalog_api::lookup::BarcodeLookupClient;
use barcode_catalog_integration_tests::{TestApp, WIDGET_BARCODE};

async fn app_against(server: &MockServer) -> TestApp {
    let config = BarcodeLookupConfig::new("k9Xq2-test-key-7Lm", &server.uri()).unwrap();
    let client = BarcodeLookupClient::new(&config).unwrap();
    TestApp::new(Arc::new(client))
}

#[tokio::test]
async fn test_ingest_normalizes_upstream_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("barcode", WIDGET_BARCODE))
        .and(query_param("formatted", "y"))
        .and(query_param("key", "k9Xq2-test-key-7Lm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [{
                "product_name": "Widget",
                "description": "A useful widget",
                "category": "Tools",
                "manufacturer": "Acme",
                "brand": "Acme",
                "ingredients": "",
                "images": ["http://x/1.jpg", null, ""]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    let (status, body) = app
        .request(
            "POST",
            "/api/products",
            Some(json!({ "barcode": WIDGET_BARCODE, "quantity": 10, "price": 9.99 })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["title"], "Widget");
    assert_eq!(body["images"], json!(["http://x/1.jpg"]));
    assert!(body.get("ingredients").is_none());
    assert_eq!(body["quantity"], 10);
    assert_eq!(body["price"], 9.99);
}

#[tokio::test]
async fn test_upstream_not_found_maps_to_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    let (status, body) = app
        .request("POST", "/api/products", Some(json!({ "barcode": WIDGET_BARCODE })))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_upstream_error_maps_to_500_without_leaking_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    let (status, body) = app
        .request("POST", "/api/products", Some(json!({ "barcode": WIDGET_BARCODE })))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error fetching product details");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_upstream_unauthorized_maps_to_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    let (status, _) = app
        .request("POST", "/api/products", Some(json!({ "barcode": WIDGET_BARCODE })))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
