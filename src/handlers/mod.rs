pub mod common;
pub mod health;
pub mod limits;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod units;

use std::sync::Arc;

use axum::Router;

use crate::AppState;

/// All resource routes mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/units", units::routes())
        .nest("/suppliers", suppliers::routes())
        .nest("/products", products::routes())
        .nest("/limits", limits::routes())
        .nest("/orders", orders::routes())
}
