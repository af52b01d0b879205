use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validate_not_blank;
use super::workflow::{
    ListDocumentsQuery, NewDocument, PageLimits, StockItemInput, StockTotals, TransferView,
    WorkflowAction, WorkflowCore,
};
use crate::auth::TenantContext;
use crate::entities::workflow_document::WorkflowKind;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::PaginatedResponse;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferInput {
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    pub departure_shop_id: String,
    #[validate(custom = "validate_not_blank")]
    pub arrival_shop_id: String,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

/// Partial update. `items` replaces the whole list; `action` is applied after
/// the name and items are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransferInput {
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub name: Option<String>,
    pub items: Option<Vec<StockItemInput>>,
    /// `approve` or `reject`
    pub action: Option<String>,
}

/// Moves stock out of a departure shop. Approval decrements each product's
/// stock by the transferred quantity.
#[derive(Debug, Clone)]
pub struct TransferService {
    core: WorkflowCore,
}

impl TransferService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        limits: PageLimits,
    ) -> Self {
        Self {
            core: WorkflowCore::new(db, WorkflowKind::Transfer, event_sender, limits),
        }
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id))]
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateTransferInput,
    ) -> Result<TransferView, ServiceError> {
        input.validate()?;
        let departure = self.core.resolve_store(ctx, &input.departure_shop_id).await?;
        let arrival = self.core.resolve_store(ctx, &input.arrival_shop_id).await?;
        if departure.id == arrival.id {
            return Err(ServiceError::ValidationError(
                "departureShopId and arrivalShopId must differ".into(),
            ));
        }

        let created = self
            .core
            .insert(
                ctx,
                NewDocument {
                    name: input.name.trim().to_string(),
                    doc_type: None,
                    shop: Some(departure),
                    target_shop: Some(arrival),
                    comment: input.comment,
                    totals: serde_json::to_value(StockTotals::default())?,
                },
            )
            .await?;
        TransferView::try_from(created)
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<TransferView, ServiceError> {
        TransferView::try_from(self.core.load(ctx, id).await?)
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        query: &ListDocumentsQuery,
    ) -> Result<PaginatedResponse<TransferView>, ServiceError> {
        let (documents, total, page) = self.core.list(ctx, query).await?;
        let views = documents
            .into_iter()
            .map(TransferView::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PaginatedResponse::new(views, total, page))
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id))]
    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateTransferInput,
    ) -> Result<TransferView, ServiceError> {
        input.validate()?;
        let action = input
            .action
            .as_deref()
            .map(|raw| WorkflowAction::parse(WorkflowKind::Transfer, raw))
            .transpose()?;

        let current = self.core.load(ctx, id).await?;
        let writes = input.name.is_some() || input.items.is_some();
        if writes && current.status.is_terminal() {
            return Err(self.core.finalized_error(&current));
        }

        let items = match &input.items {
            Some(items) => Some(self.core.stock_items(ctx, items).await?),
            None => None,
        };
        let name = input.name.map(|name| name.trim().to_string());
        self.core.write_open(ctx, id, name, items).await?;

        let document = match action {
            Some(WorkflowAction::Approve) => self.core.approve_stock_decrement(ctx, id).await?,
            Some(WorkflowAction::Reject) => self.core.reject(ctx, id).await?,
            None if writes => self.core.load(ctx, id).await?,
            None => current,
        };
        TransferView::try_from(document)
    }

    pub async fn approve(&self, ctx: &TenantContext, id: Uuid) -> Result<TransferView, ServiceError> {
        TransferView::try_from(self.core.approve_stock_decrement(ctx, id).await?)
    }

    pub async fn reject(&self, ctx: &TenantContext, id: Uuid) -> Result<TransferView, ServiceError> {
        TransferView::try_from(self.core.reject(ctx, id).await?)
    }

    pub async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        self.core.delete(ctx, id).await
    }
}
