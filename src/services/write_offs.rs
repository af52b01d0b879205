use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validate_not_blank;
use super::workflow::{
    ListDocumentsQuery, NewDocument, PageLimits, StockItemInput, StockTotals, WorkflowAction,
    WorkflowCore, WriteOffView,
};
use crate::auth::TenantContext;
use crate::entities::workflow_document::WorkflowKind;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::PaginatedResponse;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWriteOffInput {
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    pub shop_id: String,
    /// Reason category, e.g. `damaged` or `expired`
    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub doc_type: Option<String>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWriteOffInput {
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub name: Option<String>,
    pub items: Option<Vec<StockItemInput>>,
    /// `approve` or `reject`
    pub action: Option<String>,
}

/// Removes damaged or lost stock from a shop.
#[derive(Debug, Clone)]
pub struct WriteOffService {
    core: WorkflowCore,
}

impl WriteOffService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        limits: PageLimits,
    ) -> Self {
        Self {
            core: WorkflowCore::new(db, WorkflowKind::WriteOff, event_sender, limits),
        }
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id))]
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateWriteOffInput,
    ) -> Result<WriteOffView, ServiceError> {
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
                    totals: serde_json::to_value(StockTotals::default())?,
                },
            )
            .await?;
        WriteOffView::try_from(created)
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<WriteOffView, ServiceError> {
        WriteOffView::try_from(self.core.load(ctx, id).await?)
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        query: &ListDocumentsQuery,
    ) -> Result<PaginatedResponse<WriteOffView>, ServiceError> {
        let (documents, total, page) = self.core.list(ctx, query).await?;
        let views = documents
            .into_iter()
            .map(WriteOffView::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PaginatedResponse::new(views, total, page))
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id))]
    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateWriteOffInput,
    ) -> Result<WriteOffView, ServiceError> {
        input.validate()?;
        let action = input
            .action
            .as_deref()
            .map(|raw| WorkflowAction::parse(WorkflowKind::WriteOff, raw))
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
        WriteOffView::try_from(document)
    }

    pub async fn approve(&self, ctx: &TenantContext, id: Uuid) -> Result<WriteOffView, ServiceError> {
        WriteOffView::try_from(self.core.approve_stock_decrement(ctx, id).await?)
    }

    pub async fn reject(&self, ctx: &TenantContext, id: Uuid) -> Result<WriteOffView, ServiceError> {
        WriteOffView::try_from(self.core.reject(ctx, id).await?)
    }

    pub async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        self.core.delete(ctx, id).await
    }
}
