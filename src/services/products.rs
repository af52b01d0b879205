use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{validate_non_negative, validate_not_blank};
use super::workflow::PageLimits;
use crate::auth::TenantContext;
use crate::entities::workflow_document::WorkflowKind;
use crate::entities::{product, stock_movement};
use crate::errors::ServiceError;
use crate::repositories::{ProductRepository, StockMovementRepository};
use crate::PaginatedResponse;

fn default_unit() -> String {
    "pcs".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 64), custom = "validate_not_blank")]
    pub sku: String,
    #[serde(default = "default_unit")]
    #[validate(length(min = 1, max = 16))]
    pub unit: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: i32,
    #[validate(custom = "validate_non_negative")]
    #[schema(example = "149.99")]
    pub price: Decimal,
    #[validate(custom = "validate_non_negative")]
    #[schema(example = "75.00")]
    pub cost_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub unit: String,
    pub stock: i32,
    /// Retail price
    pub price: Decimal,
    /// Supply price
    pub cost_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductView {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            sku: model.sku,
            unit: model.unit,
            stock: model.stock,
            price: model.price,
            cost_price: model.cost_price,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// One row of a product's stock ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementView {
    pub id: Uuid,
    pub document_kind: WorkflowKind,
    pub document_id: Uuid,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub delta: i32,
    pub created_at: DateTime<Utc>,
}

impl From<stock_movement::Model> for StockMovementView {
    fn from(model: stock_movement::Model) -> Self {
        Self {
            id: model.id,
            document_kind: model.document_kind,
            document_id: model.document_id,
            previous_stock: model.previous_stock,
            new_stock: model.new_stock,
            delta: model.delta,
            created_at: model.created_at,
        }
    }
}

/// Catalog of the products the workflows mutate.
#[derive(Debug, Clone)]
pub struct ProductService {
    products: ProductRepository,
    movements: StockMovementRepository,
    limits: PageLimits,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, limits: PageLimits) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            movements: StockMovementRepository::new(db),
            limits,
        }
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id))]
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateProductInput,
    ) -> Result<ProductView, ServiceError> {
        input.validate()?;
        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id.clone()),
            name: Set(input.name.trim().to_string()),
            sku: Set(input.sku.trim().to_string()),
            unit: Set(input.unit),
            stock: Set(input.stock),
            price: Set(input.price),
            cost_price: Set(input.cost_price),
            ..Default::default()
        };
        let created = self.products.create(product).await?;
        info!(product_id = %created.id, "product created");
        Ok(created.into())
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<ProductView, ServiceError> {
        self.products
            .get(id, ctx.tenant_id())
            .await?
            .map(ProductView::from)
            .ok_or(ServiceError::ProductNotFound(id))
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<PaginatedResponse<ProductView>, ServiceError> {
        let page = self.limits.page_request(page, limit)?;
        let (products, total) = self.products.list(ctx.tenant_id(), page).await?;
        Ok(PaginatedResponse::new(
            products.into_iter().map(ProductView::from).collect(),
            total,
            page,
        ))
    }

    /// Stock ledger of a product, newest first.
    pub async fn movements(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<PaginatedResponse<StockMovementView>, ServiceError> {
        self.get(ctx, id).await?;
        let page = self.limits.page_request(page, limit)?;
        let (movements, total) = self
            .movements
            .list_for_product(ctx.tenant_id(), id, page)
            .await?;
        Ok(PaginatedResponse::new(
            movements.into_iter().map(StockMovementView::from).collect(),
            total,
            page,
        ))
    }
}
