use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{BaseRepository, PageRequest, Repository};
use crate::entities::store::{ActiveModel, Column, Entity as Store, Model};
use crate::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct StoreRepository {
    base: BaseRepository,
}

impl StoreRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, store: ActiveModel) -> Result<Model, ServiceError> {
        store
            .insert(self.base.get_db())
            .await
            .map_err(|source| ServiceError::CatalogCreateFailed {
                entity: "store",
                source,
            })
    }

    pub async fn get(&self, id: Uuid, tenant_id: &str) -> Result<Option<Model>, ServiceError> {
        Ok(Store::find_by_id(id)
            .filter(Column::TenantId.eq(tenant_id))
            .one(self.base.get_db())
            .await?)
    }

    pub async fn list(
        &self,
        tenant_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<Model>, u64), ServiceError> {
        let paginator = Store::find()
            .filter(Column::TenantId.eq(tenant_id))
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .paginate(self.base.get_db(), page.limit);

        let total = paginator.num_items().await?;
        let stores = paginator.fetch_page(page.page - 1).await?;
        Ok((stores, total))
    }
}
