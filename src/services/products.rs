use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{order_item, product, quantity_limit, supplier},
    errors::ServiceError,
};

#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub code: String,
    pub name: String,
    pub unit_of_measure: String,
    pub supplier_id: i64,
    pub price: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    pub active: Option<bool>,
    pub supplier_id: Option<i64>,
}

/// Service for managing the supplier product catalog.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProduct,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db;

        supplier::Entity::find_by_id(input.supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::ReferenceError(format!("unknown supplier {}", input.supplier_id))
            })?;

        let existing = product::Entity::find()
            .filter(product::Column::Code.eq(&input.code))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "product code '{}' is already registered",
                input.code
            )));
        }

        let created = product::ActiveModel {
            code: Set(input.code),
            name: Set(input.name),
            unit_of_measure: Set(input.unit_of_measure),
            supplier_id: Set(input.supplier_id),
            price: Set(input.price),
            active: Set(input.active),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Product created: {} ({})", created.id, created.code);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filters: ProductFilters,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let mut query = product::Entity::find();
        if let Some(active) = filters.active {
            query = query.filter(product::Column::Active.eq(active));
        }
        if let Some(supplier_id) = filters.supplier_id {
            query = query.filter(product::Column::SupplierId.eq(supplier_id));
        }
        let products = query
            .order_by_asc(product::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    /// Deletes a product unless limits or order items still reference it.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: i64) -> Result<(), ServiceError> {
        let db = &*self.db;
        let product = product::Entity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {product_id} not found")))?;

        let has_limits = quantity_limit::Entity::find()
            .filter(quantity_limit::Column::ProductId.eq(product_id))
            .one(db)
            .await?
            .is_some();
        if has_limits {
            return Err(ServiceError::Conflict(format!(
                "product {product_id} has quantity limits attached"
            )));
        }

        let has_items = order_item::Entity::find()
            .filter(order_item::Column::ProductId.eq(product_id))
            .one(db)
            .await?
            .is_some();
        if has_items {
            return Err(ServiceError::Conflict(format!(
                "product {product_id} appears on order items"
            )));
        }

        product::Entity::delete_by_id(product.id).exec(db).await?;
        info!("Product deleted: {product_id}");
        Ok(())
    }
}
