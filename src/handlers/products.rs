use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{
    errors::ServiceError,
    services::products::{CreateProduct, ProductFilters},
    AppState,
};

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default = "default_unit_of_measure")]
    pub unit_of_measure: String,
    pub supplier_id: i64,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_unit_of_measure() -> String {
    "UN".to_string()
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListProductsQuery {
    pub active: Option<bool>,
    pub supplier_id: Option<i64>,
}

// Handler functions

/// Register a product in a supplier's catalog
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "Registry",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = crate::entities::product::Model),
        (status = 400, description = "Validation failed or unknown supplier", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate code", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .create_product(CreateProduct {
            code: payload.code,
            name: payload.name,
            unit_of_measure: payload.unit_of_measure,
            supplier_id: payload.supplier_id,
            price: payload.price,
            active: payload.active,
        })
        .await?;
    Ok(created_response(product))
}

/// List products, optionally filtered by active flag and supplier
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Registry",
    params(ListProductsQuery),
    responses((status = 200, description = "Matching products", body = [crate::entities::product::Model])),
    security(("api_key" = []))
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Response, ServiceError> {
    let products = state
        .services
        .products
        .list_products(ProductFilters {
            active: query.active,
            supplier_id: query.supplier_id,
        })
        .await?;
    Ok(success_response(products))
}

/// Delete a product (blocked while limits or order items reference it)
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "Registry",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product is referenced", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    state.services.products.delete_product(id).await?;
    Ok(no_content_response())
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_product))
        .route("/", get(list_products))
        .route("/:id", delete(delete_product))
}
