use sea_orm::{DatabaseConnection, DatabaseTransaction};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validate_not_blank;
use super::workflow::engine::Applied;
use super::workflow::plan::{aggregate_demand, StockDemand};
use super::workflow::totals::inventory_totals;
use super::workflow::view::decode_items;
use super::workflow::{
    settle, InventoryItemInput, InventoryLineItem, InventoryTotals, InventoryView, ItemsPayload,
    ListDocumentsQuery, NewDocument, PageLimits, ProductSnapshot, StockChange, WorkflowAction,
    WorkflowCore,
};
use crate::auth::TenantContext;
use crate::entities::product;
use crate::entities::workflow_document::{DocumentStatus, Model, WorkflowKind};
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::PaginatedResponse;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryInput {
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    pub shop_id: String,
    /// e.g. `full` or `partial`
    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub doc_type: Option<String>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryInput {
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub name: Option<String>,
    pub items: Option<Vec<InventoryItemInput>>,
    /// `finish` / `approve`, or `cancel` / `reject`
    pub action: Option<String>,
}

/// Stock count reconciliation. Finishing an inventory sets every counted
/// product's stock to the scanned quantity.
#[derive(Debug, Clone)]
pub struct InventoryService {
    core: WorkflowCore,
}

impl InventoryService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        limits: PageLimits,
    ) -> Self {
        Self {
            core: WorkflowCore::new(db, WorkflowKind::Inventory, event_sender, limits),
        }
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id))]
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateInventoryInput,
    ) -> Result<InventoryView, ServiceError> {
        input.validate()?;
        let shop = self.core.resolve_store(ctx, &input.shop_id).await?;

        let created = self
            .core
            .insert(
                ctx,
                NewDocument {
                    name: input.name.trim().to_string(),
                    doc_type: input.doc_type,
                    shop: Some(shop),
                    target_shop: None,
                    comment: input.comment,
                    totals: serde_json::to_value(InventoryTotals::default())?,
                },
            )
            .await?;
        InventoryView::try_from(created)
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<InventoryView, ServiceError> {
        InventoryView::try_from(self.core.load(ctx, id).await?)
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        query: &ListDocumentsQuery,
    ) -> Result<PaginatedResponse<InventoryView>, ServiceError> {
        let (documents, total, page) = self.core.list(ctx, query).await?;
        let views = documents
            .into_iter()
            .map(InventoryView::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PaginatedResponse::new(views, total, page))
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id))]
    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateInventoryInput,
    ) -> Result<InventoryView, ServiceError> {
        input.validate()?;
        let action = input
            .action
            .as_deref()
            .map(|raw| WorkflowAction::parse(WorkflowKind::Inventory, raw))
            .transpose()?;

        let current = self.core.load(ctx, id).await?;
        let writes = input.name.is_some() || input.items.is_some();
        if writes && current.status.is_terminal() {
            return Err(self.core.finalized_error(&current));
        }

        let items = match &input.items {
            Some(items) => Some(self.build_items(ctx, items).await?),
            None => None,
        };
        let name = input.name.map(|name| name.trim().to_string());
        self.core.write_open(ctx, id, name, items).await?;

        let document = match action {
            Some(WorkflowAction::Approve) => self.finish_document(ctx, id).await?,
            Some(WorkflowAction::Reject) => self.core.reject(ctx, id).await?,
            None if writes => self.core.load(ctx, id).await?,
            None => current,
        };
        InventoryView::try_from(document)
    }

    pub async fn finish(&self, ctx: &TenantContext, id: Uuid) -> Result<InventoryView, ServiceError> {
        InventoryView::try_from(self.finish_document(ctx, id).await?)
    }

    pub async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        self.core.delete(ctx, id).await
    }

    /// `declared` defaults to the product's stock when the line is written.
    /// Each product may be counted on one line only.
    async fn build_items(
        &self,
        ctx: &TenantContext,
        inputs: &[InventoryItemInput],
    ) -> Result<ItemsPayload, ServiceError> {
        let resolved = self.core.resolve_inputs(ctx, inputs).await?;
        let mut seen = HashSet::with_capacity(resolved.len());
        for (_, product) in &resolved {
            if !seen.insert(product.id) {
                return Err(ServiceError::ValidationError(format!(
                    "product {} is counted more than once",
                    product.id
                )));
            }
        }

        let items: Vec<InventoryLineItem> = resolved
            .into_iter()
            .map(|(input, product)| InventoryLineItem {
                product: ProductSnapshot::from(&product),
                declared: input.declared.unwrap_or(product.stock),
                scanned: input.scanned,
                supply_price: product.cost_price,
                retail_price: product.price,
            })
            .collect();
        ItemsPayload::encode(&items, &inventory_totals(&items))
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id))]
    async fn finish_document(&self, ctx: &TenantContext, id: Uuid) -> Result<Model, ServiceError> {
        let started = Instant::now();
        let document = self.core.load(ctx, id).await?;
        if document.status.is_terminal() {
            return Ok(document);
        }
        let items: Vec<InventoryLineItem> = decode_items(&document.items)?;
        let counts = aggregate_demand(items.iter().map(|item| (item.product.product_id, item.scanned)));

        match self.reconcile_all(ctx, id, &counts).await {
            Ok(Some(changes)) => self.core.report_approval(ctx, id, &changes, started),
            Ok(None) => self.core.report_skipped(id),
            Err(err) => return Err(self.core.fail_approval(id, err)),
        }
        self.core.load(ctx, id).await
    }

    async fn reconcile_all(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        counts: &[StockDemand],
    ) -> Result<Applied<Vec<StockChange>>, ServiceError> {
        let product_ids: Vec<Uuid> = counts.iter().map(|count| count.product_id).collect();
        let products = self.core.resolve_all(ctx, &product_ids).await?;

        let txn = self.core.begin().await?;
        let outcome = self.apply_counts(&txn, ctx, id, counts, &products).await;
        settle(txn, outcome).await
    }

    async fn apply_counts(
        &self,
        txn: &DatabaseTransaction,
        ctx: &TenantContext,
        id: Uuid,
        counts: &[StockDemand],
        products: &[product::Model],
    ) -> Result<Applied<Vec<StockChange>>, ServiceError> {
        let claimed = self
            .core
            .documents()
            .finalize(
                txn,
                id,
                ctx.tenant_id(),
                self.core.finalization(ctx, DocumentStatus::Approved),
            )
            .await?;
        if !claimed {
            return Ok(None);
        }

        let mut changes = Vec::with_capacity(counts.len());
        for (count, product) in counts.iter().zip(products) {
            let previous = self
                .core
                .products()
                .current_stock(txn, product.id)
                .await?
                .ok_or(ServiceError::ProductNotFound(product.id))?;
            let written = self
                .core
                .products()
                .set_stock(txn, product.id, &product.tenant_id, count.qty)
                .await?;
            if !written {
                return Err(ServiceError::ProductNotFound(product.id));
            }
            if previous == count.qty {
                continue;
            }

            debug!(product_id = %product.id, previous, scanned = count.qty, "stock reconciled");
            let change = StockChange {
                tenant_id: product.tenant_id.clone(),
                product_id: product.id,
                previous_stock: previous,
                new_stock: count.qty,
            };
            self.core.record_movement(txn, id, &change).await?;
            changes.push(change);
        }
        Ok(Some(changes))
    }
}
