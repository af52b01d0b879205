use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{BaseRepository, PageRequest, Repository};
use crate::entities::product::{ActiveModel, Column, Entity as Product, Model};
use crate::errors::ServiceError;

/// Product Aggregate Store.
///
/// Reads are tenant-scoped. The mutators are narrow single-statement writes
/// that take the connection to run on, so that workflow approvals can run
/// them inside their transaction.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, product: ActiveModel) -> Result<Model, ServiceError> {
        product
            .insert(self.base.get_db())
            .await
            .map_err(|source| ServiceError::CatalogCreateFailed {
                entity: "product",
                source,
            })
    }

    /// Tenant-scoped lookup.
    pub async fn get(&self, id: Uuid, tenant_id: &str) -> Result<Option<Model>, ServiceError> {
        Ok(Product::find_by_id(id)
            .filter(Column::TenantId.eq(tenant_id))
            .one(self.base.get_db())
            .await?)
    }

    /// Lookup used by the workflows: the tenant's own product first, then any
    /// product with that id regardless of tenant (legacy cross-tenant references).
    pub async fn resolve<C>(
        &self,
        conn: &C,
        id: Uuid,
        tenant_id: &str,
    ) -> Result<Option<Model>, ServiceError>
    where
        C: ConnectionTrait,
    {
        let scoped = Product::find_by_id(id)
            .filter(Column::TenantId.eq(tenant_id))
            .one(conn)
            .await?;
        if scoped.is_some() {
            return Ok(scoped);
        }

        let global = Product::find_by_id(id).one(conn).await?;
        if let Some(product) = &global {
            tracing::debug!(
                product_id = %id,
                tenant_id,
                owner_tenant = %product.tenant_id,
                "resolved product outside the requesting tenant"
            );
        }
        Ok(global)
    }

    pub async fn list(
        &self,
        tenant_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<Model>, u64), ServiceError> {
        let paginator = Product::find()
            .filter(Column::TenantId.eq(tenant_id))
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .paginate(self.base.get_db(), page.limit);

        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page.page - 1).await?;
        Ok((products, total))
    }

    /// Absolute stock write. Returns whether a row was updated.
    pub async fn set_stock<C>(
        &self,
        conn: &C,
        id: Uuid,
        tenant_id: &str,
        new_stock: i32,
    ) -> Result<bool, ServiceError>
    where
        C: ConnectionTrait,
    {
        let result = Product::update_many()
            .col_expr(Column::Stock, Expr::value(new_stock))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .filter(Column::TenantId.eq(tenant_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Conditional delta: `stock = stock - qty` only while `stock >= qty`.
    /// Returns `false` when the guard rejected the write.
    pub async fn decrement_stock<C>(
        &self,
        conn: &C,
        id: Uuid,
        tenant_id: &str,
        qty: i32,
    ) -> Result<bool, ServiceError>
    where
        C: ConnectionTrait,
    {
        let result = Product::update_many()
            .col_expr(Column::Stock, Expr::col(Column::Stock).sub(qty))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Stock.gte(qty))
            .exec(conn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Absolute price write.
    pub async fn set_prices<C>(
        &self,
        conn: &C,
        id: Uuid,
        tenant_id: &str,
        supply: Decimal,
        retail: Decimal,
    ) -> Result<bool, ServiceError>
    where
        C: ConnectionTrait,
    {
        let result = Product::update_many()
            .col_expr(Column::CostPrice, Expr::value(supply))
            .col_expr(Column::Price, Expr::value(retail))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .filter(Column::TenantId.eq(tenant_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Current stock of a product, read on `conn`.
    pub async fn current_stock<C>(&self, conn: &C, id: Uuid) -> Result<Option<i32>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(Product::find_by_id(id).one(conn).await?.map(|p| p.stock))
    }
}

impl Repository for ProductRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
