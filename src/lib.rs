//! Stock Workflow API
//!
//! Multi-tenant back-office service for the documents that move retail stock
//! and prices: transfers, write-offs, repricings and inventories.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use utoipa::ToSchema;

use crate::repositories::PageRequest;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Wires every service on top of an already migrated database.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: Arc<events::EventSender>,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone(), &config);
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// List envelope shared by every collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: PageRequest) -> Self {
        Self {
            items,
            total,
            page: page.page,
            limit: page.limit,
            total_pages: total.div_ceil(page.limit),
        }
    }
}

pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/transfers", handlers::transfers::transfers_routes())
        .nest("/write-offs", handlers::write_offs::write_offs_routes())
        .nest("/repricings", handlers::repricings::repricings_routes())
        .nest("/inventories", handlers::inventories::inventories_routes())
        .nest("/products", handlers::products::products_routes())
        .nest("/stores", handlers::stores::stores_routes())
}

/// Full application router: health, metrics, the v1 API and Swagger UI,
/// wrapped in tracing, compression and request-id middleware.
pub fn app_router(state: AppState) -> Router {
    let health = health::health_routes_with_state(state.db.clone());

    Router::new()
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
        .nest("/health", health)
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http().make_span_with(crate::tracing::RequestSpanMaker))
        .layer(CompressionLayer::new())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = PaginatedResponse::new(vec![1, 2], 41, PageRequest::new(1, 20));
        assert_eq!(page.total_pages, 3);

        let empty: PaginatedResponse<u8> = PaginatedResponse::new(vec![], 0, PageRequest::new(1, 20));
        assert_eq!(empty.total_pages, 0);
    }
}
