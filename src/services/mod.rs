pub mod limits;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod units;

use std::sync::Arc;

use crate::db::DbPool;

/// Aggregated services used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub units: units::UnitService,
    pub suppliers: suppliers::SupplierService,
    pub products: products::ProductService,
    pub limits: limits::LimitService,
    pub orders: orders::OrderService,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            units: units::UnitService::new(db.clone()),
            suppliers: suppliers::SupplierService::new(db.clone()),
            products: products::ProductService::new(db.clone()),
            limits: limits::LimitService::new(db.clone()),
            orders: orders::OrderService::new(db),
        }
    }
}
