//! Shared state machine behind the four workflow services.

use chrono::Utc;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, Set, TransactionTrait,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::items::{ItemInput, ProductSnapshot, StockItemInput, StockLineItem};
use super::plan::{aggregate_demand, StockDemand};
use super::query::{ListDocumentsQuery, PageLimits};
use super::totals::stock_totals;
use super::view::decode_items;
use crate::auth::TenantContext;
use crate::entities::workflow_document::{ActiveModel, DocumentStatus, Model, WorkflowKind};
use crate::entities::{product, store};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::metrics::WorkflowMetrics;
use crate::repositories::document_repository::Finalization;
use crate::repositories::stock_movement_repository::NewStockMovement;
use crate::repositories::{
    DocumentRepository, PageRequest, ProductRepository, StockMovementRepository, StoreRepository,
};
use crate::services::parse_id;

/// Creation fields common to every kind.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub doc_type: Option<String>,
    pub shop: Option<store::Model>,
    pub target_shop: Option<store::Model>,
    pub comment: Option<String>,
    /// Totals of the empty item list
    pub totals: serde_json::Value,
}

/// Replacement item list, already resolved and totalled.
#[derive(Debug, Clone)]
pub struct ItemsPayload {
    pub items: serde_json::Value,
    pub totals: serde_json::Value,
    pub count: usize,
}

impl ItemsPayload {
    pub fn encode<I, T>(items: &[I], totals: &T) -> Result<Self, ServiceError>
    where
        I: serde::Serialize,
        T: serde::Serialize,
    {
        Ok(Self {
            items: serde_json::to_value(items)?,
            totals: serde_json::to_value(totals)?,
            count: items.len(),
        })
    }
}

/// One applied stock change, reported after commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockChange {
    pub tenant_id: String,
    pub product_id: Uuid,
    pub previous_stock: i32,
    pub new_stock: i32,
}

/// Outcome of pass 2. `None` means another request finalized the document
/// first and nothing was applied.
pub type Applied<T> = Option<T>;

/// Commits when the work applied, rolls back otherwise.
pub async fn settle<T>(
    txn: DatabaseTransaction,
    outcome: Result<Applied<T>, ServiceError>,
) -> Result<Applied<T>, ServiceError> {
    match outcome {
        Ok(Some(value)) => {
            txn.commit().await?;
            Ok(Some(value))
        }
        Ok(None) => {
            txn.rollback().await?;
            Ok(None)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

/// Repositories and collaborators shared by one workflow kind.
#[derive(Debug, Clone)]
pub struct WorkflowCore {
    db: Arc<DatabaseConnection>,
    documents: DocumentRepository,
    products: ProductRepository,
    stores: StoreRepository,
    movements: StockMovementRepository,
    event_sender: Arc<EventSender>,
    limits: PageLimits,
}

impl WorkflowCore {
    pub fn new(
        db: Arc<DatabaseConnection>,
        kind: WorkflowKind,
        event_sender: Arc<EventSender>,
        limits: PageLimits,
    ) -> Self {
        Self {
            documents: DocumentRepository::new(db.clone(), kind),
            products: ProductRepository::new(db.clone()),
            stores: StoreRepository::new(db.clone()),
            movements: StockMovementRepository::new(db.clone()),
            db,
            event_sender,
            limits,
        }
    }

    pub fn kind(&self) -> WorkflowKind {
        self.documents.kind()
    }

    pub fn products(&self) -> &ProductRepository {
        &self.products
    }

    pub fn documents(&self) -> &DocumentRepository {
        &self.documents
    }

    pub async fn begin(&self) -> Result<DatabaseTransaction, ServiceError> {
        Ok(self.db.begin().await?)
    }

    pub fn publish(&self, event: Event) {
        self.event_sender.send_or_log(event);
    }

    pub async fn load(&self, ctx: &TenantContext, id: Uuid) -> Result<Model, ServiceError> {
        self.documents
            .get(id, ctx.tenant_id())
            .await?
            .ok_or_else(|| ServiceError::not_found(self.kind(), id))
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        query: &ListDocumentsQuery,
    ) -> Result<(Vec<Model>, u64, PageRequest), ServiceError> {
        let parsed = query.parse(self.kind(), self.limits)?;
        let (documents, total) = self
            .documents
            .list(ctx.tenant_id(), &parsed.filter, parsed.sort, parsed.page)
            .await?;
        Ok((documents, total, parsed.page))
    }

    /// Resolves a store id within the caller's tenant.
    pub async fn resolve_store(
        &self,
        ctx: &TenantContext,
        raw_id: &str,
    ) -> Result<store::Model, ServiceError> {
        let id = parse_id(raw_id)?;
        self.stores
            .get(id, ctx.tenant_id())
            .await?
            .ok_or(ServiceError::StoreNotFound(id))
    }

    pub async fn resolve_optional_store(
        &self,
        ctx: &TenantContext,
        raw_id: Option<&str>,
    ) -> Result<Option<store::Model>, ServiceError> {
        match raw_id.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Ok(Some(self.resolve_store(ctx, raw).await?)),
            None => Ok(None),
        }
    }

    /// Tenant-scoped lookup with the global fallback.
    pub async fn resolve_product<C>(
        &self,
        conn: &C,
        ctx: &TenantContext,
        id: Uuid,
    ) -> Result<product::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        self.products
            .resolve(conn, id, ctx.tenant_id())
            .await?
            .ok_or(ServiceError::ProductNotFound(id))
    }

    /// Validates every input row and resolves its product, in list order.
    pub async fn resolve_inputs<'a, I>(
        &self,
        ctx: &TenantContext,
        inputs: &'a [I],
    ) -> Result<Vec<(&'a I, product::Model)>, ServiceError>
    where
        I: ItemInput,
    {
        let mut resolved = Vec::with_capacity(inputs.len());
        for input in inputs {
            input.validate()?;
            let product_id = parse_id(input.raw_product_id())?;
            let product = self
                .resolve_product(self.db.as_ref(), ctx, product_id)
                .await?;
            resolved.push((input, product));
        }
        Ok(resolved)
    }

    #[instrument(skip(self, ctx, new), fields(kind = %self.kind(), tenant_id = %ctx.tenant_id))]
    pub async fn insert(&self, ctx: &TenantContext, new: NewDocument) -> Result<Model, ServiceError> {
        let (shop_id, shop_name) = split_store(new.shop);
        let (target_shop_id, target_shop_name) = split_store(new.target_shop);

        let document = ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id.clone()),
            name: Set(new.name),
            doc_type: Set(new.doc_type),
            shop_id: Set(shop_id),
            shop_name: Set(shop_name),
            target_shop_id: Set(target_shop_id),
            target_shop_name: Set(target_shop_name),
            comment: Set(new.comment),
            items: Set(serde_json::Value::Array(Vec::new())),
            totals: Set(new.totals),
            created_by_id: Set(ctx.actor.id.clone()),
            created_by_name: Set(ctx.actor.name.clone()),
            finished_by_id: Set(None),
            finished_by_name: Set(None),
            ..Default::default()
        };

        let created = self.documents.create(document).await?;
        info!(document_id = %created.id, "workflow document created");

        WorkflowMetrics::record_created(self.kind());
        self.publish(Event::DocumentCreated {
            kind: self.kind(),
            document_id: created.id,
            tenant_id: created.tenant_id.clone(),
        });
        Ok(created)
    }

    /// Writes the name and/or items of a document that is still open.
    pub async fn write_open(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        name: Option<String>,
        items: Option<ItemsPayload>,
    ) -> Result<(), ServiceError> {
        if name.is_none() && items.is_none() {
            return Ok(());
        }
        let item_count = items.as_ref().map(|payload| payload.count);

        let written = self
            .documents
            .update_open(
                id,
                ctx.tenant_id(),
                name,
                items.map(|payload| (payload.items, payload.totals)),
            )
            .await
            .map_err(ServiceError::update_failed(self.kind()))?;
        if !written {
            return Err(self.closed_error(ctx, id).await);
        }

        if let Some(item_count) = item_count {
            self.publish(Event::DocumentItemsReplaced {
                kind: self.kind(),
                document_id: id,
                tenant_id: ctx.tenant_id.clone(),
                item_count,
            });
        }
        Ok(())
    }

    /// Error for a conditional write that matched no open document: the
    /// document is either gone or already terminal.
    async fn closed_error(&self, ctx: &TenantContext, id: Uuid) -> ServiceError {
        match self.documents.get(id, ctx.tenant_id()).await {
            Ok(Some(document)) => self.finalized_error(&document),
            Ok(None) => ServiceError::not_found(self.kind(), id),
            Err(err) => err,
        }
    }

    pub fn finalized_error(&self, document: &Model) -> ServiceError {
        ServiceError::AlreadyFinalized {
            kind: self.kind(),
            id: document.id,
            status: document.status.to_string(),
        }
    }

    pub fn finalization<'a>(&self, ctx: &'a TenantContext, status: DocumentStatus) -> Finalization<'a> {
        Finalization {
            status,
            finished_by_id: &ctx.actor.id,
            finished_by_name: &ctx.actor.name,
            finished_at: Utc::now(),
        }
    }

    /// Terminal transition with no side effects. A document that is already
    /// terminal is returned unchanged.
    #[instrument(skip(self, ctx), fields(kind = %self.kind(), tenant_id = %ctx.tenant_id))]
    pub async fn reject(&self, ctx: &TenantContext, id: Uuid) -> Result<Model, ServiceError> {
        let document = self.load(ctx, id).await?;
        if document.status.is_terminal() {
            return Ok(document);
        }

        let claimed = self
            .documents
            .finalize(
                self.db.as_ref(),
                id,
                ctx.tenant_id(),
                self.finalization(ctx, DocumentStatus::Rejected),
            )
            .await
            .map_err(ServiceError::update_failed(self.kind()))?;
        if claimed {
            info!(document_id = %id, finished_by = %ctx.actor.id, "workflow document rejected");
            WorkflowMetrics::record_rejected(self.kind());
            self.publish(Event::DocumentRejected {
                kind: self.kind(),
                document_id: id,
                tenant_id: ctx.tenant_id.clone(),
                finished_by: ctx.actor.id.clone(),
            });
        }
        self.load(ctx, id).await
    }

    /// Deletes an open document. Terminal documents are kept because their
    /// effects cannot be undone by removing them.
    #[instrument(skip(self, ctx), fields(kind = %self.kind(), tenant_id = %ctx.tenant_id))]
    pub async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        let deleted = self
            .documents
            .delete_open(id, ctx.tenant_id())
            .await
            .map_err(ServiceError::update_failed(self.kind()))?;
        if !deleted {
            return Err(self.closed_error(ctx, id).await);
        }

        info!(document_id = %id, "workflow document deleted");
        self.publish(Event::DocumentDeleted {
            kind: self.kind(),
            document_id: id,
            tenant_id: ctx.tenant_id.clone(),
        });
        Ok(())
    }

    /// Appends a ledger row for a stock change made inside `txn`.
    pub async fn record_movement(
        &self,
        txn: &DatabaseTransaction,
        document_id: Uuid,
        change: &StockChange,
    ) -> Result<(), ServiceError> {
        self.movements
            .record(
                txn,
                NewStockMovement {
                    tenant_id: &change.tenant_id,
                    product_id: change.product_id,
                    document_kind: self.kind(),
                    document_id,
                    previous_stock: change.previous_stock,
                    new_stock: change.new_stock,
                },
            )
            .await?;
        Ok(())
    }

    /// Builds transfer/write-off lines. Omitted prices default to the
    /// product's current prices.
    pub async fn stock_items(
        &self,
        ctx: &TenantContext,
        inputs: &[StockItemInput],
    ) -> Result<ItemsPayload, ServiceError> {
        let items: Vec<StockLineItem> = self
            .resolve_inputs(ctx, inputs)
            .await?
            .into_iter()
            .map(|(input, product)| StockLineItem {
                product: ProductSnapshot::from(&product),
                qty: input.qty,
                supply_price: input.supply_price.unwrap_or(product.cost_price),
                retail_price: input.retail_price.unwrap_or(product.price),
            })
            .collect();
        ItemsPayload::encode(&items, &stock_totals(&items))
    }

    /// Pass 1 product resolution for an approval, in the given order.
    pub async fn resolve_all(
        &self,
        ctx: &TenantContext,
        product_ids: &[Uuid],
    ) -> Result<Vec<product::Model>, ServiceError> {
        let mut products = Vec::with_capacity(product_ids.len());
        for product_id in product_ids {
            products.push(
                self.resolve_product(self.db.as_ref(), ctx, *product_id)
                    .await?,
            );
        }
        Ok(products)
    }

    pub fn report_skipped(&self, document_id: Uuid) {
        info!(kind = %self.kind(), %document_id, "approval skipped, document already finalized");
    }

    /// Records a failed approval and maps storage errors to the kind's
    /// update failure.
    pub fn fail_approval(&self, document_id: Uuid, err: ServiceError) -> ServiceError {
        WorkflowMetrics::record_approval_failure(self.kind());
        warn!(
            kind = %self.kind(),
            %document_id,
            code = %err.code(),
            error = %err,
            "approval rejected"
        );
        ServiceError::update_failed(self.kind())(err)
    }

    /// Publishes committed stock changes and the approval itself.
    pub fn report_approval(
        &self,
        ctx: &TenantContext,
        document_id: Uuid,
        changes: &[StockChange],
        started: Instant,
    ) {
        let mut units = 0u64;
        for change in changes {
            units += u64::from((change.new_stock - change.previous_stock).unsigned_abs());
            self.publish(Event::StockAdjusted {
                tenant_id: change.tenant_id.clone(),
                product_id: change.product_id,
                document_kind: self.kind(),
                document_id,
                previous_stock: change.previous_stock,
                new_stock: change.new_stock,
            });
        }
        if units > 0 {
            WorkflowMetrics::record_stock_units_moved(self.kind(), units);
        }

        info!(
            kind = %self.kind(),
            %document_id,
            finished_by = %ctx.actor.id,
            products = changes.len(),
            "workflow document approved"
        );
        WorkflowMetrics::record_approved(self.kind(), started.elapsed());
        self.publish(Event::DocumentApproved {
            kind: self.kind(),
            document_id,
            tenant_id: ctx.tenant_id.clone(),
            finished_by: ctx.actor.id.clone(),
        });
    }

    /// Approval of a document whose lines take stock away (transfers and
    /// write-offs).
    ///
    /// Pass 1 checks every product against the summed demand without writing
    /// anything. Pass 2 claims the transition and applies conditional
    /// decrements in one transaction, so the document either moves all of
    /// its stock or none of it.
    #[instrument(skip(self, ctx), fields(kind = %self.kind(), tenant_id = %ctx.tenant_id))]
    pub async fn approve_stock_decrement(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> Result<Model, ServiceError> {
        let started = Instant::now();
        let document = self.load(ctx, id).await?;
        if document.status.is_terminal() {
            return Ok(document);
        }

        let items: Vec<StockLineItem> = decode_items(&document.items)?;
        let demand = aggregate_demand(items.iter().map(|item| (item.product.product_id, item.qty)));

        match self.decrement_all(ctx, id, &demand).await {
            Ok(Some(changes)) => self.report_approval(ctx, id, &changes, started),
            Ok(None) => self.report_skipped(id),
            Err(err) => return Err(self.fail_approval(id, err)),
        }
        self.load(ctx, id).await
    }

    async fn decrement_all(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        demand: &[StockDemand],
    ) -> Result<Applied<Vec<StockChange>>, ServiceError> {
        let product_ids: Vec<Uuid> = demand.iter().map(|line| line.product_id).collect();
        let products = self.resolve_all(ctx, &product_ids).await?;
        let mut targets = Vec::with_capacity(demand.len());
        for (line, product) in demand.iter().zip(products) {
            line.check(self.kind(), product.stock)?;
            targets.push((*line, product));
        }

        let txn = self.begin().await?;
        let outcome = self.apply_decrements(&txn, ctx, id, &targets).await;
        settle(txn, outcome).await
    }

    async fn apply_decrements(
        &self,
        txn: &DatabaseTransaction,
        ctx: &TenantContext,
        id: Uuid,
        targets: &[(StockDemand, product::Model)],
    ) -> Result<Applied<Vec<StockChange>>, ServiceError> {
        let claimed = self
            .documents
            .finalize(txn, id, ctx.tenant_id(), self.finalization(ctx, DocumentStatus::Approved))
            .await?;
        if !claimed {
            return Ok(None);
        }

        let mut changes = Vec::with_capacity(targets.len());
        for (line, product) in targets {
            let decremented = self
                .products
                .decrement_stock(txn, product.id, &product.tenant_id, line.qty)
                .await?;
            let current = self
                .products
                .current_stock(txn, product.id)
                .await?
                .ok_or(ServiceError::ProductNotFound(product.id))?;
            if !decremented {
                // Stock moved between the two passes.
                return Err(ServiceError::QtyExceedsStock {
                    kind: self.kind(),
                    product_id: product.id,
                    requested: line.qty,
                    available: current,
                });
            }

            let change = StockChange {
                tenant_id: product.tenant_id.clone(),
                product_id: product.id,
                previous_stock: current + line.qty,
                new_stock: current,
            };
            self.record_movement(txn, id, &change).await?;
            changes.push(change);
        }
        Ok(Some(changes))
    }
}

fn split_store(store: Option<store::Model>) -> (Option<Uuid>, Option<String>) {
    match store {
        Some(store) => (Some(store.id), Some(store.name)),
        None => (None, None),
    }
}

