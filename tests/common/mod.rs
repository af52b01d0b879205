#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use stock_workflow_api::{
    auth::{Actor, TenantContext, TENANT_HEADER, USER_ID_HEADER, USER_NAME_HEADER},
    config::AppConfig,
    db,
    events::{self, EventSender},
    services::{
        products::{CreateProductInput, ProductView},
        stores::{CreateStoreInput, StoreView},
        workflow::{InventoryItemInput, RepricingItemInput, StockItemInput},
    },
    AppState,
};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Helper harness for spinning up an application state backed by a throwaway
/// SQLite database file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = db_dir.path().join("workflow_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = stock_workflow_api::app_router(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    pub fn ctx(&self, tenant_id: &str) -> TenantContext {
        TenantContext::new(tenant_id, Actor::new("user-1", "Test User"))
    }

    pub async fn seed_store(&self, ctx: &TenantContext, name: &str) -> StoreView {
        self.state
            .services
            .stores
            .create(
                ctx,
                CreateStoreInput {
                    name: name.to_string(),
                    address: None,
                },
            )
            .await
            .expect("seed store for tests")
    }

    pub async fn seed_product(
        &self,
        ctx: &TenantContext,
        sku: &str,
        stock: i32,
        price: Decimal,
        cost_price: Decimal,
    ) -> ProductView {
        self.state
            .services
            .products
            .create(
                ctx,
                CreateProductInput {
                    name: format!("Product {}", sku),
                    sku: sku.to_string(),
                    unit: "pcs".to_string(),
                    stock,
                    price,
                    cost_price,
                },
            )
            .await
            .expect("seed product for tests")
    }

    pub async fn stock_of(&self, ctx: &TenantContext, product_id: Uuid) -> i32 {
        self.state
            .services
            .products
            .get(ctx, product_id)
            .await
            .expect("product exists")
            .stock
    }

    /// Send a request against the full router, optionally scoped to a tenant.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        tenant_id: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tenant) = tenant_id {
            builder = builder
                .header(TENANT_HEADER, tenant)
                .header(USER_ID_HEADER, "user-1")
                .header(USER_NAME_HEADER, "Test User");
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub fn stock_item(product_id: Uuid, qty: i32) -> StockItemInput {
    StockItemInput {
        product_id: product_id.to_string(),
        qty,
        supply_price: None,
        retail_price: None,
    }
}

pub fn repricing_item(product_id: Uuid, supply_price: Decimal, retail_price: Decimal) -> RepricingItemInput {
    RepricingItemInput {
        product_id: product_id.to_string(),
        qty: None,
        supply_price,
        retail_price,
    }
}

pub fn inventory_item(product_id: Uuid, scanned: i32) -> InventoryItemInput {
    InventoryItemInput {
        product_id: product_id.to_string(),
        scanned,
        declared: None,
    }
}

pub async fn read_json(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body is not json")
}
