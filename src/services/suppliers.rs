use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{product, supplier},
    errors::ServiceError,
};

#[derive(Debug, Clone)]
pub struct CreateSupplier {
    pub code: String,
    pub legal_name: String,
    pub tax_id: Option<String>,
    pub order_email: Option<String>,
    pub sla_days: i32,
}

/// Service for managing suppliers.
#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DbPool>,
}

impl SupplierService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_supplier(
        &self,
        input: CreateSupplier,
    ) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db;
        let existing = supplier::Entity::find()
            .filter(supplier::Column::Code.eq(&input.code))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "supplier code '{}' is already registered",
                input.code
            )));
        }

        let created = supplier::ActiveModel {
            code: Set(input.code),
            legal_name: Set(input.legal_name),
            tax_id: Set(input.tax_id),
            order_email: Set(input.order_email),
            sla_days: Set(input.sla_days),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Supplier created: {} ({})", created.id, created.code);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        let suppliers = supplier::Entity::find()
            .order_by_asc(supplier::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(suppliers)
    }

    /// Deletes a supplier unless products still reference it.
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, supplier_id: i64) -> Result<(), ServiceError> {
        let db = &*self.db;
        let supplier = supplier::Entity::find_by_id(supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("supplier {supplier_id} not found")))?;

        let has_products = product::Entity::find()
            .filter(product::Column::SupplierId.eq(supplier_id))
            .one(db)
            .await?
            .is_some();
        if has_products {
            return Err(ServiceError::Conflict(format!(
                "supplier {supplier_id} has products attached"
            )));
        }

        supplier::Entity::delete_by_id(supplier.id).exec(db).await?;
        info!("Supplier deleted: {supplier_id}");
        Ok(())
    }
}
