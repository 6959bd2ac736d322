use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use utoipa::ToSchema;

use super::common::{created_response, no_content_response, success_response};
use crate::{errors::ServiceError, services::limits::CreateLimit, AppState};

// Request DTOs

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLimitRequest {
    pub unit_id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub min_quantity: Decimal,
    #[serde(default = "default_max_quantity")]
    pub max_quantity: Decimal,
}

fn default_max_quantity() -> Decimal {
    dec!(999999)
}

// Handler functions

/// Set the allowed order-quantity range for a (unit, product) pair
#[utoipa::path(
    post,
    path = "/api/v1/limits",
    tag = "Registry",
    request_body = CreateLimitRequest,
    responses(
        (status = 201, description = "Limit created", body = crate::entities::quantity_limit::Model),
        (status = 400, description = "Unknown unit or product, or inverted bounds", body = crate::errors::ErrorResponse),
        (status = 409, description = "A limit for this pair already exists", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn create_limit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateLimitRequest>,
) -> Result<Response, ServiceError> {
    let limit = state
        .services
        .limits
        .create_limit(CreateLimit {
            unit_id: payload.unit_id,
            product_id: payload.product_id,
            min_quantity: payload.min_quantity,
            max_quantity: payload.max_quantity,
        })
        .await?;
    Ok(created_response(limit))
}

/// List quantity limits
#[utoipa::path(
    get,
    path = "/api/v1/limits",
    tag = "Registry",
    responses((status = 200, description = "All limits", body = [crate::entities::quantity_limit::Model])),
    security(("api_key" = []))
)]
pub async fn list_limits(State(state): State<Arc<AppState>>) -> Result<Response, ServiceError> {
    let limits = state.services.limits.list_limits().await?;
    Ok(success_response(limits))
}

/// Delete a quantity limit
#[utoipa::path(
    delete,
    path = "/api/v1/limits/{id}",
    tag = "Registry",
    params(("id" = i64, Path, description = "Limit id")),
    responses(
        (status = 204, description = "Limit deleted"),
        (status = 404, description = "Unknown limit", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn delete_limit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    state.services.limits.delete_limit(id).await?;
    Ok(no_content_response())
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_limit))
        .route("/", get(list_limits))
        .route("/:id", delete(delete_limit))
}
