use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{errors::ServiceError, services::suppliers::CreateSupplier, AppState};

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub legal_name: String,
    pub tax_id: Option<String>,
    #[validate(email)]
    pub order_email: Option<String>,
    /// Delivery lead time in days
    #[serde(default = "default_sla_days")]
    pub sla_days: i32,
}

fn default_sla_days() -> i32 {
    2
}

// Handler functions

/// Register a supplier
#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    tag = "Registry",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = crate::entities::supplier::Model),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate code", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn create_supplier(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let supplier = state
        .services
        .suppliers
        .create_supplier(CreateSupplier {
            code: payload.code,
            legal_name: payload.legal_name,
            tax_id: payload.tax_id,
            order_email: payload.order_email,
            sla_days: payload.sla_days,
        })
        .await?;
    Ok(created_response(supplier))
}

/// List suppliers
#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    tag = "Registry",
    responses((status = 200, description = "All suppliers", body = [crate::entities::supplier::Model])),
    security(("api_key" = []))
)]
pub async fn list_suppliers(State(state): State<Arc<AppState>>) -> Result<Response, ServiceError> {
    let suppliers = state.services.suppliers.list_suppliers().await?;
    Ok(success_response(suppliers))
}

/// Delete a supplier (blocked while products reference it)
#[utoipa::path(
    delete,
    path = "/api/v1/suppliers/{id}",
    tag = "Registry",
    params(("id" = i64, Path, description = "Supplier id")),
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 404, description = "Unknown supplier", body = crate::errors::ErrorResponse),
        (status = 409, description = "Supplier has products attached", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn delete_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    state.services.suppliers.delete_supplier(id).await?;
    Ok(no_content_response())
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_supplier))
        .route("/", get(list_suppliers))
        .route("/:id", delete(delete_supplier))
}
