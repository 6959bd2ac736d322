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
use crate::{errors::ServiceError, services::units::CreateUnit, AppState};

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUnitRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub tax_id: Option<String>,
    pub cost_center: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

// Handler functions

/// Register a store unit
#[utoipa::path(
    post,
    path = "/api/v1/units",
    tag = "Registry",
    request_body = CreateUnitRequest,
    responses(
        (status = 201, description = "Unit created", body = crate::entities::unit::Model),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate code", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn create_unit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUnitRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let unit = state
        .services
        .units
        .create_unit(CreateUnit {
            code: payload.code,
            name: payload.name,
            tax_id: payload.tax_id,
            cost_center: payload.cost_center,
            active: payload.active,
        })
        .await?;
    Ok(created_response(unit))
}

/// List store units
#[utoipa::path(
    get,
    path = "/api/v1/units",
    tag = "Registry",
    responses((status = 200, description = "All units", body = [crate::entities::unit::Model])),
    security(("api_key" = []))
)]
pub async fn list_units(State(state): State<Arc<AppState>>) -> Result<Response, ServiceError> {
    let units = state.services.units.list_units().await?;
    Ok(success_response(units))
}

/// Delete a store unit (blocked while orders reference it)
#[utoipa::path(
    delete,
    path = "/api/v1/units/{id}",
    tag = "Registry",
    params(("id" = i64, Path, description = "Unit id")),
    responses(
        (status = 204, description = "Unit deleted"),
        (status = 404, description = "Unknown unit", body = crate::errors::ErrorResponse),
        (status = 409, description = "Unit has orders attached", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn delete_unit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    state.services.units.delete_unit(id).await?;
    Ok(no_content_response())
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_unit))
        .route("/", get(list_units))
        .route("/:id", delete(delete_unit))
}
