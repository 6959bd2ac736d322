//! Brewstock API Library
//!
//! Purchase-order management backend for a multi-unit coffee retail
//! operation: registry CRUD around a small order-lifecycle core.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{middleware, response::Redirect, routing::get, Router};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

/// Shared application state: one connection pool, the configuration it was
/// built from and the service layer over it.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: services::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = services::AppServices::new(db.clone());
        Self {
            db,
            config,
            services,
        }
    }
}

/// Build the full application router. `/api/v1` sits behind the API-key
/// middleware; `/`, `/health` and the Swagger UI are open.
pub fn app(state: Arc<AppState>) -> Router {
    let api_keys = auth::ApiKeys::new(state.config.api_keys());

    Router::new()
        .route("/", get(|| async { Redirect::to("/docs") }))
        .route("/health", get(handlers::health::health))
        .nest(
            "/api/v1",
            handlers::api_v1_routes().layer(middleware::from_fn_with_state(
                api_keys,
                auth::require_api_key,
            )),
        )
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
