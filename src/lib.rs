//! Procure API Library
//!
//! This crate provides the core functionality for the Procure API
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::AuthRouterExt;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// Versioned API routes. Resource routers are bearer-token protected; delete
// routers additionally require the admin role.
pub fn api_v1_routes() -> Router<AppState> {
    let vendors = handlers::vendors::vendor_routes().with_auth();
    let vendors_delete = handlers::vendors::vendor_delete_routes().with_role("admin");

    let items = handlers::items::item_routes().with_auth();
    let items_delete = handlers::items::item_delete_routes().with_role("admin");

    let part_codes = handlers::part_codes::part_code_routes().with_auth();
    let part_codes_delete = handlers::part_codes::part_code_delete_routes().with_role("admin");

    let purchase_orders = handlers::purchase_orders::purchase_order_routes().with_auth();
    let purchase_orders_delete =
        handlers::purchase_orders::purchase_order_delete_routes().with_role("admin");

    let purchase_order_items = handlers::purchase_orders::purchase_order_item_routes().with_auth();
    let purchase_order_items_delete =
        handlers::purchase_orders::purchase_order_item_delete_routes().with_role("admin");

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Vendors API
        .nest("/vendors", vendors.merge(vendors_delete))
        // Items API
        .nest("/items", items.merge(items_delete))
        // Part codes API
        .nest("/part-codes", part_codes.merge(part_codes_delete))
        // Procurement API
        .nest(
            "/purchase-orders",
            purchase_orders.merge(purchase_orders_delete),
        )
        .nest(
            "/purchase-order-items",
            purchase_order_items.merge(purchase_order_items_delete),
        )
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "procure-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
