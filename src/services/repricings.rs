use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DatabaseTransaction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validate_not_blank;
use super::workflow::engine::Applied;
use super::workflow::totals::repricing_totals;
use super::workflow::view::decode_items;
use super::workflow::{
    settle, ItemsPayload, ListDocumentsQuery, NewDocument, PageLimits, ProductSnapshot,
    RepricingItemInput, RepricingLineItem, RepricingTotals, RepricingView, WorkflowAction,
    WorkflowCore,
};
use crate::auth::TenantContext;
use crate::entities::product;
use crate::entities::workflow_document::{DocumentStatus, Model, WorkflowKind};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::PaginatedResponse;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepricingInput {
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub name: String,
    /// Shop the price change applies to, if any
    pub shop_id: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub doc_type: Option<String>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRepricingInput {
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub name: Option<String>,
    pub items: Option<Vec<RepricingItemInput>>,
    /// `approve` or `reject`
    pub action: Option<String>,
}

#[derive(Debug, Clone)]
struct PriceChange {
    tenant_id: String,
    product_id: Uuid,
    old_supply_price: Decimal,
    old_retail_price: Decimal,
    supply_price: Decimal,
    retail_price: Decimal,
}

/// Changes supply and retail prices. Approval writes the new prices; stock is
/// never touched.
#[derive(Debug, Clone)]
pub struct RepricingService {
    core: WorkflowCore,
}

impl RepricingService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        limits: PageLimits,
    ) -> Self {
        Self {
            core: WorkflowCore::new(db, WorkflowKind::Repricing, event_sender, limits),
        }
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id))]
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateRepricingInput,
    ) -> Result<RepricingView, ServiceError> {
        input.validate()?;
        let shop = self
            .core
            .resolve_optional_store(ctx, input.shop_id.as_deref())
            .await?;

        let created = self
            .core
            .insert(
                ctx,
                NewDocument {
                    name: input.name.trim().to_string(),
                    doc_type: input.doc_type,
                    shop,
                    target_shop: None,
                    comment: input.comment,
                    totals: serde_json::to_value(RepricingTotals::default())?,
                },
            )
            .await?;
        RepricingView::try_from(created)
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<RepricingView, ServiceError> {
        RepricingView::try_from(self.core.load(ctx, id).await?)
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        query: &ListDocumentsQuery,
    ) -> Result<PaginatedResponse<RepricingView>, ServiceError> {
        let (documents, total, page) = self.core.list(ctx, query).await?;
        let views = documents
            .into_iter()
            .map(RepricingView::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PaginatedResponse::new(views, total, page))
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id))]
    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateRepricingInput,
    ) -> Result<RepricingView, ServiceError> {
        input.validate()?;
        let action = input
            .action
            .as_deref()
            .map(|raw| WorkflowAction::parse(WorkflowKind::Repricing, raw))
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
            Some(WorkflowAction::Approve) => self.approve_document(ctx, id).await?,
            Some(WorkflowAction::Reject) => self.core.reject(ctx, id).await?,
            None if writes => self.core.load(ctx, id).await?,
            None => current,
        };
        RepricingView::try_from(document)
    }

    pub async fn approve(&self, ctx: &TenantContext, id: Uuid) -> Result<RepricingView, ServiceError> {
        RepricingView::try_from(self.approve_document(ctx, id).await?)
    }

    pub async fn reject(&self, ctx: &TenantContext, id: Uuid) -> Result<RepricingView, ServiceError> {
        RepricingView::try_from(self.core.reject(ctx, id).await?)
    }

    pub async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        self.core.delete(ctx, id).await
    }

    /// Snapshots the current prices as the old prices. `qty` defaults to the
    /// product's stock.
    async fn build_items(
        &self,
        ctx: &TenantContext,
        inputs: &[RepricingItemInput],
    ) -> Result<ItemsPayload, ServiceError> {
        let items: Vec<RepricingLineItem> = self
            .core
            .resolve_inputs(ctx, inputs)
            .await?
            .into_iter()
            .map(|(input, product)| RepricingLineItem {
                product: ProductSnapshot::from(&product),
                qty: input.qty.unwrap_or(product.stock.max(0)),
                old_supply_price: product.cost_price,
                old_retail_price: product.price,
                supply_price: input.supply_price,
                retail_price: input.retail_price,
            })
            .collect();
        ItemsPayload::encode(&items, &repricing_totals(&items))
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id))]
    async fn approve_document(&self, ctx: &TenantContext, id: Uuid) -> Result<Model, ServiceError> {
        let started = Instant::now();
        let document = self.core.load(ctx, id).await?;
        if document.status.is_terminal() {
            return Ok(document);
        }
        let items: Vec<RepricingLineItem> = decode_items(&document.items)?;

        match self.reprice_all(ctx, id, &items).await {
            Ok(Some(changes)) => {
                for change in changes {
                    self.core.publish(Event::PricesChanged {
                        tenant_id: change.tenant_id,
                        product_id: change.product_id,
                        document_id: id,
                        old_supply_price: change.old_supply_price,
                        old_retail_price: change.old_retail_price,
                        supply_price: change.supply_price,
                        retail_price: change.retail_price,
                    });
                }
                self.core.report_approval(ctx, id, &[], started);
            }
            Ok(None) => self.core.report_skipped(id),
            Err(err) => return Err(self.core.fail_approval(id, err)),
        }
        self.core.load(ctx, id).await
    }

    async fn reprice_all(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        items: &[RepricingLineItem],
    ) -> Result<Applied<Vec<PriceChange>>, ServiceError> {
        let product_ids: Vec<Uuid> = items.iter().map(|item| item.product.product_id).collect();
        let products = self.core.resolve_all(ctx, &product_ids).await?;

        let txn = self.core.begin().await?;
        let outcome = self.apply_prices(&txn, ctx, id, items, &products).await;
        settle(txn, outcome).await
    }

    async fn apply_prices(
        &self,
        txn: &DatabaseTransaction,
        ctx: &TenantContext,
        id: Uuid,
        items: &[RepricingLineItem],
        products: &[product::Model],
    ) -> Result<Applied<Vec<PriceChange>>, ServiceError> {
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

        let mut changes = Vec::with_capacity(items.len());
        for (item, product) in items.iter().zip(products) {
            let written = self
                .core
                .products()
                .set_prices(
                    txn,
                    product.id,
                    &product.tenant_id,
                    item.supply_price,
                    item.retail_price,
                )
                .await?;
            if !written {
                return Err(ServiceError::ProductNotFound(product.id));
            }
            debug!(
                product_id = %product.id,
                supply_price = %item.supply_price,
                retail_price = %item.retail_price,
                "product repriced"
            );
            changes.push(PriceChange {
                tenant_id: product.tenant_id.clone(),
                product_id: product.id,
                old_supply_price: product.cost_price,
                old_retail_price: product.price,
                supply_price: item.supply_price,
                retail_price: item.retail_price,
            });
        }
        Ok(Some(changes))
    }
}
