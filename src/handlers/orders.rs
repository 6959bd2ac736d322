use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{
    entities::OrderStatus,
    errors::ServiceError,
    services::orders::{
        DecideOrder, NewOrder, NewOrderItem, OrderAggregate, OrderFilters, OrderSummary,
        ReceiveOrder,
    },
    AppState,
};

// Request DTOs

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: i64,
    /// Must be greater than zero
    pub quantity: Decimal,
    /// Defaults to the product's current catalog price
    pub price: Option<Decimal>,
    /// Free text justifying an out-of-band quantity
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub unit_id: i64,
    #[validate(length(min = 1))]
    pub manager_name: String,
    pub contact: Option<String>,
    pub supplier_id: i64,
    pub desired_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DecisionRequest {
    #[validate(length(min = 1))]
    pub decided_by: String,
    pub approved: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReceiptRequest {
    pub received_on: NaiveDate,
    /// Must be greater than zero
    pub quantity_received: Decimal,
    pub divergence: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListOrdersQuery {
    pub unit_id: Option<i64>,
    pub supplier_id: Option<i64>,
    pub status: Option<OrderStatus>,
    /// Calendar month (1-12); only applied together with `year`
    pub month: Option<u32>,
    /// Only applied together with `month`
    pub year: Option<i32>,
}

// Handler functions

/// Create a draft purchase order with its line items
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Draft order created", body = OrderAggregate),
        (status = 400, description = "Bad quantity or dangling reference", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let aggregate = state
        .services
        .orders
        .create_order(NewOrder {
            unit_id: payload.unit_id,
            manager_name: payload.manager_name,
            contact: payload.contact,
            supplier_id: payload.supplier_id,
            desired_date: payload.desired_date,
            notes: payload.notes,
            items: payload
                .items
                .into_iter()
                .map(|item| NewOrderItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                    reason: item.reason,
                })
                .collect(),
        })
        .await?;
    Ok(created_response(aggregate))
}

/// Fetch one order with items, approvals and receipts
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order aggregate", body = OrderAggregate),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    let aggregate = state.services.orders.get_order(id).await?;
    Ok(success_response(aggregate))
}

/// List orders newest-first, with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "Orders",
    params(ListOrdersQuery),
    responses((status = 200, description = "Matching orders", body = [OrderSummary])),
    security(("api_key" = []))
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Response, ServiceError> {
    let orders = state
        .services
        .orders
        .list_orders(OrderFilters {
            unit_id: query.unit_id,
            supplier_id: query.supplier_id,
            status: query.status,
            month: query.month,
            year: query.year,
        })
        .await?;
    Ok(success_response(orders))
}

/// Delete an order and all of its child records
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    state.services.orders.delete_order(id).await?;
    Ok(no_content_response())
}

/// Submit a draft: authorize it or route it through approval
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/submit",
    tag = "Workflow",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order now pending approval or authorized", body = OrderAggregate),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order is not a draft", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn submit_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    let aggregate = state.services.orders.submit_order(id).await?;
    Ok(success_response(aggregate))
}

/// Record a manager decision on a pending (or rejected) order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/decision",
    tag = "Workflow",
    params(("id" = i64, Path, description = "Order id")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = OrderAggregate),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order does not accept decisions", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn decide_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let aggregate = state
        .services
        .orders
        .decide_order(
            id,
            DecideOrder {
                decided_by: payload.decided_by,
                approved: payload.approved,
                reason: payload.reason,
            },
        )
        .await?;
    Ok(success_response(aggregate))
}

/// Record a delivery against an authorized (or already received) order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/receipts",
    tag = "Workflow",
    params(("id" = i64, Path, description = "Order id")),
    request_body = ReceiptRequest,
    responses(
        (status = 200, description = "Receipt recorded", body = OrderAggregate),
        (status = 400, description = "Non-positive quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order does not accept receipts", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn receive_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ReceiptRequest>,
) -> Result<Response, ServiceError> {
    let aggregate = state
        .services
        .orders
        .receive_order(
            id,
            ReceiveOrder {
                received_on: payload.received_on,
                quantity_received: payload.quantity_received,
                divergence: payload.divergence,
            },
        )
        .await?;
    Ok(success_response(aggregate))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_order))
        .route("/", get(list_orders))
        .route("/:id", get(get_order).delete(delete_order))
        .route("/:id/submit", post(submit_order))
        .route("/:id/decision", post(decide_order))
        .route("/:id/receipts", post(receive_order))
}
