use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities;
use crate::errors::ErrorResponse;
use crate::handlers;
use crate::services::orders::{OrderAggregate, OrderSummary};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Brewstock API",
        version = "0.2.0",
        description = "Purchase-order backend for a multi-unit coffee retail operation. \
            Store units order from approved suppliers; per-(unit, product) quantity limits \
            route out-of-band orders through manager approval; receipts are tracked against \
            orders. Send the shared key in the `x-api-key` header on every `/api/v1` request."
    ),
    paths(
        handlers::health::health,
        handlers::units::create_unit,
        handlers::units::list_units,
        handlers::units::delete_unit,
        handlers::suppliers::create_supplier,
        handlers::suppliers::list_suppliers,
        handlers::suppliers::delete_supplier,
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::delete_product,
        handlers::limits::create_limit,
        handlers::limits::list_limits,
        handlers::limits::delete_limit,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::orders::delete_order,
        handlers::orders::submit_order,
        handlers::orders::decide_order,
        handlers::orders::receive_order,
    ),
    components(schemas(
        ErrorResponse,
        entities::OrderStatus,
        entities::unit::Model,
        entities::supplier::Model,
        entities::product::Model,
        entities::quantity_limit::Model,
        entities::purchase_order::Model,
        entities::order_item::Model,
        entities::approval::Model,
        entities::receipt::Model,
        OrderAggregate,
        OrderSummary,
        handlers::units::CreateUnitRequest,
        handlers::suppliers::CreateSupplierRequest,
        handlers::products::CreateProductRequest,
        handlers::limits::CreateLimitRequest,
        handlers::orders::CreateOrderRequest,
        handlers::orders::OrderItemRequest,
        handlers::orders::DecisionRequest,
        handlers::orders::ReceiptRequest,
    )),
    modifiers(&ApiKeySecurity),
    tags(
        (name = "Registry", description = "Units, suppliers, products and quantity limits"),
        (name = "Orders", description = "Purchase-order CRUD"),
        (name = "Workflow", description = "Submission, approval and receipt"),
        (name = "Util", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;

struct ApiKeySecurity;

impl Modify for ApiKeySecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(crate::auth::API_KEY_HEADER))),
            );
        }
    }
}

/// Swagger UI mounted at `/docs`, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
