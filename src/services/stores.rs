use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validate_not_blank;
use super::workflow::PageLimits;
use crate::auth::TenantContext;
use crate::entities::store;
use crate::errors::ServiceError;
use crate::repositories::StoreRepository;
use crate::PaginatedResponse;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreInput {
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreView {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<store::Model> for StoreView {
    fn from(model: store::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreService {
    stores: StoreRepository,
    limits: PageLimits,
}

impl StoreService {
    pub fn new(db: Arc<DatabaseConnection>, limits: PageLimits) -> Self {
        Self {
            stores: StoreRepository::new(db),
            limits,
        }
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id))]
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateStoreInput,
    ) -> Result<StoreView, ServiceError> {
        input.validate()?;
        let store = store::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id.clone()),
            name: Set(input.name.trim().to_string()),
            address: Set(input.address),
            created_at: Set(Utc::now()),
        };
        let created = self.stores.create(store).await?;
        info!(store_id = %created.id, "store created");
        Ok(created.into())
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<StoreView, ServiceError> {
        self.stores
            .get(id, ctx.tenant_id())
            .await?
            .map(StoreView::from)
            .ok_or(ServiceError::StoreNotFound(id))
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<PaginatedResponse<StoreView>, ServiceError> {
        let page = self.limits.page_request(page, limit)?;
        let (stores, total) = self.stores.list(ctx.tenant_id(), page).await?;
        Ok(PaginatedResponse::new(
            stores.into_iter().map(StoreView::from).collect(),
            total,
            page,
        ))
    }
}
