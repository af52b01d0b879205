use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{BaseRepository, PageRequest, Repository};
use crate::entities::stock_movement::{ActiveModel, Column, Entity as StockMovement, Model};
use crate::entities::workflow_document::WorkflowKind;
use crate::errors::ServiceError;

/// Stock change to append to the ledger.
#[derive(Debug, Clone)]
pub struct NewStockMovement<'a> {
    pub tenant_id: &'a str,
    pub product_id: Uuid,
    pub document_kind: WorkflowKind,
    pub document_id: Uuid,
    pub previous_stock: i32,
    pub new_stock: i32,
}

#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    base: BaseRepository,
}

impl StockMovementRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn record<C>(
        &self,
        conn: &C,
        movement: NewStockMovement<'_>,
    ) -> Result<Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        let row = ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(movement.tenant_id.to_string()),
            product_id: Set(movement.product_id),
            document_kind: Set(movement.document_kind),
            document_id: Set(movement.document_id),
            previous_stock: Set(movement.previous_stock),
            new_stock: Set(movement.new_stock),
            delta: Set(movement.new_stock - movement.previous_stock),
            ..Default::default()
        };
        Ok(row.insert(conn).await?)
    }

    /// Newest first.
    pub async fn list_for_product(
        &self,
        tenant_id: &str,
        product_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Model>, u64), ServiceError> {
        let paginator = StockMovement::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::ProductId.eq(product_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(self.base.get_db(), page.limit);

        let total = paginator.num_items().await?;
        let movements = paginator.fetch_page(page.page - 1).await?;
        Ok((movements, total))
    }
}
