//! Point-of-sale API library
//!
//! Catalog, directory, customers, orders, transactions and discounts behind
//! token-authenticated HTTP routes, plus the user account endpoints.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Extension, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{AuthConfig, AuthService};
use crate::handlers::{common::PaginationParams, AppServices};
use crate::repositories::{DbUserRepository, UserRepository};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub auth: Arc<AuthService>,
    pub services: AppServices,
}

impl AppState {
    /// Wire repositories, services and the token authority over one pool.
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(DbUserRepository::new(db.clone()));
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config), users.clone()));
        let services = AppServices::new(db.clone(), users);
        Self {
            db,
            config,
            auth,
            services,
        }
    }

    /// Page number and size for a list request under the configured limits.
    pub fn page_bounds(&self, params: &PaginationParams) -> (u64, u64) {
        params.clamped(
            self.config.api_default_page_size,
            self.config.api_max_page_size,
        )
    }
}

/// Resource routes mounted under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::catalog::catalog_routes())
        .merge(handlers::directory::directory_routes())
        .merge(handlers::customers::customer_routes())
        .merge(handlers::orders::order_routes())
        .merge(handlers::discounts::discount_routes())
}

/// Full application router with the state applied.
///
/// CORS and compression are left to the binary so tests see plain responses.
pub fn build_router(state: AppState) -> Router {
    let auth_service = state.auth.clone();

    Router::new()
        .route("/", get(|| async { "pos-api up" }))
        .route("/health", get(health_check))
        .merge(handlers::users::user_routes())
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Auth middleware and CurrentUser read the token authority from extensions
        .layer(Extension(auth_service))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => "healthy",
        Err(_) => "unhealthy",
    };
    let status = if database == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    ::tracing::debug!(database, "health check");
    (
        status,
        Json(json!({
            "status": database,
            "checks": { "database": database },
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
