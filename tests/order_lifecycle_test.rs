mod common;

use axum::http::Method;
use chrono::{Datelike, Utc};
use rust_decimal_macros::dec;
use serde_json::json;

use common::{decimal_field, response_json, TestApp};

#[tokio::test]
async fn order_within_limits_is_authorized_and_received() {
    let app = TestApp::new().await;
    let unit_id = app.seed_unit("CENTRO").await;
    let supplier_id = app.seed_supplier("ACME").await;
    let beans = app.seed_product("BEANS", supplier_id, "4.50").await;
    let cups = app.seed_product("CUPS", supplier_id, "0.33").await;
    app.seed_limit(unit_id, beans, "1", "100").await;

    // Draft with one explicit and one catalog-defaulted price.
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "unit_id": unit_id,
                "manager_name": "Ana",
                "supplier_id": supplier_id,
                "items": [
                    { "product_id": beans, "quantity": "5" },
                    { "product_id": cups, "quantity": "3", "price": "0.30" },
                ],
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = response_json(response).await;
    let order_id = body["id"].as_i64().expect("order id");
    assert_eq!(body["status"], "draft");
    assert_eq!(decimal_field(&body["items"][0], "price"), dec!(4.50));
    assert_eq!(decimal_field(&body["items"][0], "subtotal"), dec!(22.50));
    assert_eq!(decimal_field(&body["items"][1], "subtotal"), dec!(0.90));
    assert_eq!(decimal_field(&body, "total"), dec!(23.40));

    // 5 is inside [1, 100] and cups has no limit row, so submission
    // authorizes directly.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/submit"),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["status"], "authorized");
    assert_eq!(body["approvals"].as_array().map(Vec::len), Some(0));

    let today = Utc::now().date_naive();
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/receipts"),
            Some(json!({ "received_on": today, "quantity_received": "5" })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["status"], "received");
    assert_eq!(body["receipts"].as_array().map(Vec::len), Some(1));

    // A second delivery appends a receipt without changing the status.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/receipts"),
            Some(json!({
                "received_on": today,
                "quantity_received": "2",
                "divergence": "short by three bags",
            })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["status"], "received");
    assert_eq!(body["receipts"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["receipts"][1]["divergence"], "short by three bags");
}

#[tokio::test]
async fn limit_breach_routes_through_approval() {
    let app = TestApp::new().await;
    let unit_id = app.seed_unit("NORTE").await;
    let supplier_id = app.seed_supplier("ACME").await;
    let beans = app.seed_product("BEANS", supplier_id, "4.50").await;
    app.seed_limit(unit_id, beans, "2", "10").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "unit_id": unit_id,
                "manager_name": "Bruno",
                "supplier_id": supplier_id,
                "items": [
                    { "product_id": beans, "quantity": "50", "reason": "holiday stock" },
                ],
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let order_id = response_json(response).await["id"].as_i64().expect("id");

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/submit"),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await["status"], "pending_approval");

    // Rejection appends an approval row and parks the order.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/decision"),
            Some(json!({
                "decided_by": "Carla",
                "approved": false,
                "reason": "too much for one month",
            })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["approvals"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["approvals"][0]["approved"], false);

    // A rejected order can be re-reviewed; approval authorizes it.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/decision"),
            Some(json!({ "decided_by": "Carla", "approved": true })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["status"], "authorized");
    assert_eq!(body["approvals"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn invalid_transitions_are_conflicts() {
    let app = TestApp::new().await;
    let unit_id = app.seed_unit("SUL").await;
    let supplier_id = app.seed_supplier("ACME").await;
    let beans = app.seed_product("BEANS", supplier_id, "4.50").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "unit_id": unit_id,
                "manager_name": "Dora",
                "supplier_id": supplier_id,
                "items": [{ "product_id": beans, "quantity": "1" }],
            })),
        )
        .await;
    let order_id = response_json(response).await["id"].as_i64().expect("id");
    let today = Utc::now().date_naive();

    // A draft accepts neither decisions nor receipts.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/decision"),
            Some(json!({ "decided_by": "Eva", "approved": true })),
        )
        .await;
    assert_eq!(response.status(), 409);
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/receipts"),
            Some(json!({ "received_on": today, "quantity_received": "1" })),
        )
        .await;
    assert_eq!(response.status(), 409);

    // Submitting twice conflicts on the second attempt.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/submit"),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/submit"),
            None,
        )
        .await;
    assert_eq!(response.status(), 409);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Conflict");
    assert_eq!(body["message"], "status authorized does not permit submit");

    // Authorized orders do not accept decisions.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/decision"),
            Some(json!({ "decided_by": "Eva", "approved": true })),
        )
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn create_order_validates_quantities_and_references() {
    let app = TestApp::new().await;
    let unit_id = app.seed_unit("OESTE").await;
    let supplier_id = app.seed_supplier("ACME").await;
    let other_supplier = app.seed_supplier("GLOBEX").await;
    let beans = app.seed_product("BEANS", supplier_id, "4.50").await;
    let foreign = app.seed_product("SYRUP", other_supplier, "9.90").await;

    // Non-positive quantity.
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "unit_id": unit_id,
                "manager_name": "Fabio",
                "supplier_id": supplier_id,
                "items": [{ "product_id": beans, "quantity": "0" }],
            })),
        )
        .await;
    assert_eq!(response.status(), 400);

    // Product from a different supplier.
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "unit_id": unit_id,
                "manager_name": "Fabio",
                "supplier_id": supplier_id,
                "items": [{ "product_id": foreign, "quantity": "1" }],
            })),
        )
        .await;
    assert_eq!(response.status(), 400);

    // Unknown unit.
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "unit_id": 9999,
                "manager_name": "Fabio",
                "supplier_id": supplier_id,
                "items": [{ "product_id": beans, "quantity": "1" }],
            })),
        )
        .await;
    assert_eq!(response.status(), 400);

    // A failed creation leaves nothing behind.
    let response = app.request(Method::GET, "/api/v1/orders", None).await;
    assert_eq!(response_json(response).await.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn receipt_quantity_must_be_positive() {
    let app = TestApp::new().await;
    let unit_id = app.seed_unit("LESTE").await;
    let supplier_id = app.seed_supplier("ACME").await;
    let beans = app.seed_product("BEANS", supplier_id, "4.50").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "unit_id": unit_id,
                "manager_name": "Gil",
                "supplier_id": supplier_id,
                "items": [{ "product_id": beans, "quantity": "1" }],
            })),
        )
        .await;
    let order_id = response_json(response).await["id"].as_i64().expect("id");
    app.request(
        Method::POST,
        &format!("/api/v1/orders/{order_id}/submit"),
        None,
    )
    .await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/receipts"),
            Some(json!({
                "received_on": Utc::now().date_naive(),
                "quantity_received": "0",
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn list_orders_filters_and_orders_newest_first() {
    let app = TestApp::new().await;
    let unit_a = app.seed_unit("A").await;
    let unit_b = app.seed_unit("B").await;
    let supplier_id = app.seed_supplier("ACME").await;
    let beans = app.seed_product("BEANS", supplier_id, "4.50").await;

    let mut ids = Vec::new();
    for unit_id in [unit_a, unit_a, unit_b] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/orders",
                Some(json!({
                    "unit_id": unit_id,
                    "manager_name": "Hugo",
                    "supplier_id": supplier_id,
                    "items": [{ "product_id": beans, "quantity": "1" }],
                })),
            )
            .await;
        ids.push(response_json(response).await["id"].as_i64().expect("id"));
    }
    app.request(Method::POST, &format!("/api/v1/orders/{}/submit", ids[2]), None)
        .await;

    // Newest first overall.
    let response = app.request(Method::GET, "/api/v1/orders", None).await;
    let body = response_json(response).await;
    let listed: Vec<i64> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|o| o["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);
    assert_eq!(body[0]["items"].as_array().map(Vec::len), Some(1));

    // Unit filter.
    let response = app
        .request(Method::GET, &format!("/api/v1/orders?unit_id={unit_a}"), None)
        .await;
    assert_eq!(response_json(response).await.as_array().map(Vec::len), Some(2));

    // Status filter.
    let response = app
        .request(Method::GET, "/api/v1/orders?status=draft", None)
        .await;
    assert_eq!(response_json(response).await.as_array().map(Vec::len), Some(2));

    // Month window: everything was created just now, so the current month
    // matches and a past month does not.
    let now = Utc::now();
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/orders?month={}&year={}", now.month(), now.year()),
            None,
        )
        .await;
    assert_eq!(response_json(response).await.as_array().map(Vec::len), Some(3));
    let response = app
        .request(Method::GET, "/api/v1/orders?month=1&year=1999", None)
        .await;
    assert_eq!(response_json(response).await.as_array().map(Vec::len), Some(0));

    // Month without year is ignored rather than applied.
    let response = app
        .request(Method::GET, "/api/v1/orders?month=1", None)
        .await;
    assert_eq!(response_json(response).await.as_array().map(Vec::len), Some(3));

    // Out-of-range month is rejected.
    let response = app
        .request(Method::GET, "/api/v1/orders?month=13&year=2025", None)
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn delete_order_removes_children() {
    let app = TestApp::new().await;
    let unit_id = app.seed_unit("CENTRO").await;
    let supplier_id = app.seed_supplier("ACME").await;
    let beans = app.seed_product("BEANS", supplier_id, "4.50").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "unit_id": unit_id,
                "manager_name": "Iris",
                "supplier_id": supplier_id,
                "items": [{ "product_id": beans, "quantity": "2" }],
            })),
        )
        .await;
    let order_id = response_json(response).await["id"].as_i64().expect("id");

    let response = app
        .request(Method::DELETE, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(response.status(), 204);

    let response = app
        .request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(response.status(), 404);

    // With the order item gone the product is free to delete again.
    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{beans}"), None)
        .await;
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn api_requires_a_key_but_health_is_open() {
    let app = TestApp::new().await;

    let response = app.request_anonymous(Method::GET, "/api/v1/orders").await;
    assert_eq!(response.status(), 401);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Unauthorized");

    let response = app.request_anonymous(Method::GET, "/health").await;
    assert_eq!(response.status(), 200);
}
