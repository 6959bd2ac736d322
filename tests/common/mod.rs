use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use brewstock_api::{app, config::AppConfig, db, AppState};

/// The development fallback key; the test environment accepts it.
pub const TEST_API_KEY: &str = "dev-123";

/// Helper harness wrapping the full router over an in-memory SQLite
/// database (single connection, so every request sees the same store).
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 0, "test");
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::connect(&cfg).await.expect("database connection");
        db::run_migrations(&pool).await.expect("migrations");

        let state = Arc::new(AppState::new(Arc::new(pool), cfg));
        Self { router: app(state) }
    }

    /// Issue a request carrying the API key.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-api-key", TEST_API_KEY);
        let request = match body {
            Some(payload) => builder
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        self.router.clone().oneshot(request).await.expect("response")
    }

    /// Issue a request without any API key header.
    pub async fn request_anonymous(&self, method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        self.router.clone().oneshot(request).await.expect("response")
    }

    // Seed helpers: create registry rows through the public API and hand
    // back the generated ids.

    pub async fn seed_unit(&self, code: &str) -> i64 {
        let response = self
            .request(
                Method::POST,
                "/api/v1/units",
                Some(json!({ "code": code, "name": format!("Unit {code}") })),
            )
            .await;
        assert_eq!(response.status(), 201, "seeding unit {code}");
        response_json(response).await["id"].as_i64().expect("unit id")
    }

    pub async fn seed_supplier(&self, code: &str) -> i64 {
        let response = self
            .request(
                Method::POST,
                "/api/v1/suppliers",
                Some(json!({ "code": code, "legal_name": format!("Supplier {code} Ltda") })),
            )
            .await;
        assert_eq!(response.status(), 201, "seeding supplier {code}");
        response_json(response).await["id"]
            .as_i64()
            .expect("supplier id")
    }

    pub async fn seed_product(&self, code: &str, supplier_id: i64, price: &str) -> i64 {
        let response = self
            .request(
                Method::POST,
                "/api/v1/products",
                Some(json!({
                    "code": code,
                    "name": format!("Product {code}"),
                    "supplier_id": supplier_id,
                    "price": price,
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "seeding product {code}");
        response_json(response).await["id"]
            .as_i64()
            .expect("product id")
    }

    pub async fn seed_limit(&self, unit_id: i64, product_id: i64, min: &str, max: &str) -> i64 {
        let response = self
            .request(
                Method::POST,
                "/api/v1/limits",
                Some(json!({
                    "unit_id": unit_id,
                    "product_id": product_id,
                    "min_quantity": min,
                    "max_quantity": max,
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "seeding limit");
        response_json(response).await["id"].as_i64().expect("limit id")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Decimals serialize as JSON strings; parse one back for comparison.
#[allow(dead_code)]
pub fn decimal_field(value: &Value, key: &str) -> Decimal {
    value[key]
        .as_str()
        .unwrap_or_else(|| panic!("field {key} missing or not a string in {value}"))
        .parse()
        .expect("decimal field")
}
